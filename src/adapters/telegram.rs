use crate::domain::model::{ApiEnvelope, BotCommand, Message, OutgoingMessage, Update, User};
use crate::domain::ports::{ConfigProvider, TelegramApi};
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// 一般方法的請求逾時；long poll 另外加上 margin
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const LONG_POLL_MARGIN: Duration = Duration::from_secs(10);

/// Bot API client over HTTPS. Every method POSTs JSON to
/// `{base}/bot{token}/{method}` and unwraps the response envelope.
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        let base_url: String = api_base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &impl ConfigProvider) -> Self {
        Self::new(config.bot_token(), config.api_base_url())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<P, T>(&self, method: &str, payload: &P, timeout: Duration) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("Calling Bot API method: {}", method);

        let response = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            // 錯誤裡的 URL 含 token，必須剝掉
            .map_err(|e| BotError::ApiError(e.without_url()))?;

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| BotError::ApiError(e.without_url()))?;

        if envelope.ok {
            return envelope.result.ok_or_else(|| BotError::TelegramError {
                code: 0,
                description: format!("{}: ok response without result", method),
            });
        }

        let code = envelope.error_code.unwrap_or(0);
        if code == 429 {
            let retry_after = envelope
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(1);
            return Err(BotError::TooManyRequests { retry_after });
        }

        Err(BotError::TelegramError {
            code,
            description: envelope
                .description
                .unwrap_or_else(|| format!("{} failed", method)),
        })
    }
}

#[async_trait]
impl TelegramApi for TelegramClient {
    async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({}), REQUEST_TIMEOUT)
            .await
    }

    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let payload = GetUpdatesPayload {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let timeout = Duration::from_secs(timeout_secs) + LONG_POLL_MARGIN;
        self.call("getUpdates", &payload, timeout).await
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<Message> {
        self.call("sendMessage", message, REQUEST_TIMEOUT).await
    }

    async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<()> {
        let payload = SetMyCommandsPayload { commands };
        let _: bool = self
            .call("setMyCommands", &payload, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct GetUpdatesPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SetMyCommandsPayload<'a> {
    commands: &'a [BotCommand],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_embeds_token() {
        let client = TelegramClient::new("42:secret", "https://api.telegram.org/");
        assert_eq!(
            client.method_url("getMe"),
            "https://api.telegram.org/bot42:secret/getMe"
        );
    }

    #[test]
    fn test_get_updates_payload_omits_missing_offset() {
        let payload = GetUpdatesPayload {
            offset: None,
            timeout: 30,
            allowed_updates: &["message"],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("offset").is_none());
        assert_eq!(json["timeout"], 30);

        let payload = GetUpdatesPayload {
            offset: Some(124),
            timeout: 30,
            allowed_updates: &["message"],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["offset"], 124);
    }
}
