pub mod bag;
pub mod extract;
pub mod model;
pub mod risk;
pub mod ssl;
pub mod summary;
pub mod target;

pub use bag::{AdapterResult, CrtShData, HomePage, LiveScan, RawScanBag, UrlScanOutcome};
pub use model::{Finding, Severity};
pub use risk::{build_live_risks, build_summary_risks, worst_severity};
pub use ssl::SslJob;
pub use summary::{summarize, summarize_at, ScanSummary};
pub use target::{Target, TargetError};
