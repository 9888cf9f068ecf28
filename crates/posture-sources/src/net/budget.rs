use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock ceiling for a polling loop.
#[derive(Debug, Clone)]
pub struct PollBudget {
    deadline: Instant,
    interval: Duration,
}

impl PollBudget {
    pub fn new(ceiling: Duration, interval: Duration) -> Self {
        Self {
            deadline: Instant::now() + ceiling,
            interval,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.checked_duration_since(Instant::now())
    }

    pub fn expired(&self) -> bool {
        self.remaining().map_or(true, |d| d.is_zero())
    }

    /// Sleeps for one poll interval. Returns `false` without sleeping when
    /// the ceiling has already been reached.
    pub async fn wait(&self) -> bool {
        if self.expired() {
            return false;
        }
        tokio::time::sleep(self.interval).await;
        true
    }

    /// Per-request timeout clamped to the time left on the budget, with a
    /// floor of one second so the last poll still gets a chance.
    pub fn clamp(&self, per_request: Duration) -> Duration {
        self.remaining()
            .map(|rem| rem.min(per_request))
            .unwrap_or(per_request)
            .max(Duration::from_secs(1).min(per_request))
    }
}
