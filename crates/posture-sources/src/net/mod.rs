pub mod budget;
pub mod http_client;

pub use budget::PollBudget;
pub use http_client::{flatten_headers, CappedResponse, ReqwestHttpClient};
