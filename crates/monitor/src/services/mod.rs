use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub mod email_service;
pub mod log_service;
pub mod telegram_service;

pub use email_service::{EmailDispatcher, SmtpSettings};
pub use log_service::LogDispatcher;
pub use telegram_service::TelegramDispatcher;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Delivers a rendered alert for one symbol.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn send(&self, symbol: &str, subject: &str, body: &str) -> Result<(), DispatchError>;
}

/// How alerts leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertChannel {
    Email(SmtpSettings),
    Telegram { token: String, chat_id: i64 },
    Log,
}

pub fn build_dispatcher(channel: &AlertChannel) -> Result<Arc<dyn AlertDispatcher>, DispatchError> {
    let dispatcher: Arc<dyn AlertDispatcher> = match channel {
        AlertChannel::Email(settings) => Arc::new(EmailDispatcher::new(settings)?),
        AlertChannel::Telegram { token, chat_id } => {
            Arc::new(TelegramDispatcher::new(token, *chat_id))
        }
        AlertChannel::Log => Arc::new(LogDispatcher),
    };
    Ok(dispatcher)
}
