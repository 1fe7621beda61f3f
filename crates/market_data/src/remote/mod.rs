pub mod chart_response;
pub mod yahoo_client;

pub use chart_response::ChartResponse;
pub use yahoo_client::{YahooDividendClient, YahooSettings};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
