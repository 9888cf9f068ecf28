//! Source adapters. Each one queries a single external source and folds
//! every fault into its [`AdapterResult`]; nothing here returns `Err`.

pub mod builtwith;
pub mod crtsh;
pub mod page;
pub mod robots;
pub mod shodan;
pub mod ssllabs;
pub mod urlscan;

pub use builtwith::BuiltWithSource;
pub use crtsh::CrtShSource;
pub use page::PageSource;
pub use robots::RobotsSource;
pub use shodan::ShodanSource;
pub use ssllabs::SslLabsSource;
pub use urlscan::UrlScanSource;

use crate::error::SourceError;
use posture_core::{AdapterResult, Target};
use tracing::warn;

#[async_trait::async_trait]
pub trait Source: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn fetch(&self, target: &Target) -> AdapterResult<Self::Output>;
}

/// Converts an adapter failure into its error marker, e.g.
/// `"crt.sh request failed: 503"`.
pub(crate) fn failed<T>(source: &str, prefix: &str, err: SourceError) -> AdapterResult<T> {
    let cause = err.cause();
    warn!(source, error = %err, "source failed: {}", cause);
    AdapterResult::Error(format!("{}: {}", prefix, cause))
}

/// Joins a configured base URL and a path without doubling slashes.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
