use crate::domain::model::{BotCommand, Message, OutgoingMessage, Update, User};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn bot_token(&self) -> &str;
    fn registration_url(&self) -> &str;
    fn api_base_url(&self) -> &str;
    fn poll_timeout_secs(&self) -> u64;
}

/// The subset of Bot API methods the bot actually calls.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn get_me(&self) -> Result<User>;
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>>;
    async fn send_message(&self, message: &OutgoingMessage) -> Result<Message>;
    async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<()>;
}

#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: &Update) -> Result<Vec<OutgoingMessage>>;
}
