pub mod dispatcher;
pub mod engine;

pub use crate::domain::model::{OutgoingMessage, Update};
pub use crate::domain::ports::{ConfigProvider, TelegramApi, UpdateHandler};
pub use crate::utils::error::Result;
