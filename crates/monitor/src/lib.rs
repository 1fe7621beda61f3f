pub mod alert;
pub mod classifier;
pub mod config;
pub mod monitor;
pub mod services;
pub mod symbols;

pub use classifier::{ChangeClassifier, ChangeVerdict, Direction};
pub use config::{ConfigError, MonitorConfig};
pub use monitor::{DividendMonitor, MonitorError, MonitorSettings, RunReport};
pub use services::{AlertChannel, AlertDispatcher, DispatchError};
