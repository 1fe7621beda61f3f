pub mod error;
pub mod remote;
pub mod traits;

pub use error::FetchError;
pub use remote::{YahooDividendClient, YahooSettings};
pub use traits::DividendFetcher;
