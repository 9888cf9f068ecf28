use crate::error::SourceError;
use crate::net::ReqwestHttpClient;
use crate::sources::{
    BuiltWithSource, CrtShSource, PageSource, RobotsSource, ShodanSource, Source, SslLabsSource,
    UrlScanSource,
};
use posture_config::SourcesConfig;
use posture_core::{build_live_risks, LiveScan, RawScanBag, Target};
use std::time::Instant;
use tracing::info;

/// Runs every source adapter for one target concurrently and assembles the
/// bag. There is no scan-wide timeout: each adapter's own ceiling bounds
/// the scan.
#[derive(Clone, Debug)]
pub struct Orchestrator {
    crtsh: CrtShSource,
    page: PageSource,
    robots: RobotsSource,
    ssl: SslLabsSource,
    urlscan: UrlScanSource,
    builtwith: BuiltWithSource,
    shodan: Option<ShodanSource>,
}

impl Orchestrator {
    pub fn from_config(config: &SourcesConfig) -> Result<Self, SourceError> {
        let http = ReqwestHttpClient::new(&config.user_agent)?;
        let shodan = config.shodan_api_key.as_deref().map(|key| {
            ShodanSource::new(http.clone(), &config.shodan_url, key, config.request_timeout())
        });
        Ok(Self {
            crtsh: CrtShSource::new(http.clone(), config),
            page: PageSource::new(http.clone(), config),
            robots: RobotsSource::new(http.clone(), config),
            ssl: SslLabsSource::new(http.clone(), config),
            urlscan: UrlScanSource::new(http.clone(), config),
            builtwith: BuiltWithSource::new(http, config),
            shodan,
        })
    }

    pub fn shodan_enabled(&self) -> bool {
        self.shodan.is_some()
    }

    pub async fn run_scan(&self, target: &Target) -> RawScanBag {
        let started = Instant::now();
        info!(domain = %target.domain, url = %target.url, "scan started");

        let shodan = async {
            match &self.shodan {
                Some(source) => Some(source.fetch(target).await),
                None => None,
            }
        };
        let (crtsh, home, robots, ssl, urlscan, builtwith, shodan) = tokio::join!(
            self.crtsh.fetch(target),
            self.page.fetch(target),
            self.robots.fetch(target),
            self.ssl.fetch(target),
            self.urlscan.fetch(target),
            self.builtwith.fetch(target),
            shodan,
        );

        let bag = RawScanBag {
            domain: target.domain.clone(),
            url: target.url.clone(),
            crtsh,
            home,
            robots,
            ssl,
            urlscan,
            builtwith,
            shodan,
        };

        let failed = [
            bag.crtsh.is_error(),
            bag.home.is_error(),
            bag.ssl.is_error(),
            bag.urlscan.is_error(),
            bag.builtwith.is_error(),
            bag.shodan.as_ref().is_some_and(|s| s.is_error()),
        ]
        .iter()
        .filter(|f| **f)
        .count();
        info!(
            domain = %target.domain,
            elapsed_ms = started.elapsed().as_millis() as u64,
            failed_sources = failed,
            "scan finished"
        );
        bag
    }

    /// Scan plus the live risk pass.
    pub async fn live_scan(&self, target: &Target) -> LiveScan {
        let bag = self.run_scan(target).await;
        let risks = build_live_risks(&bag);
        LiveScan { bag, risks }
    }
}
