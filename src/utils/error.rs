use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    TelegramError { code: i64, description: String },

    #[error("Rate limited by Telegram, retry after {retry_after}s")]
    TooManyRequests { retry_after: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BotError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Transient network conditions, the polling loop retries these
            BotError::ApiError(_) | BotError::TooManyRequests { .. } => ErrorSeverity::Medium,
            // 401/403 mean the token is dead, nothing to retry
            BotError::TelegramError { code, .. } if *code == 401 || *code == 403 => {
                ErrorSeverity::Critical
            }
            BotError::TelegramError { .. } => ErrorSeverity::High,
            BotError::IoError(_) | BotError::SerializationError(_) => ErrorSeverity::High,
            BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BotError::ApiError(_) => {
                "Check network connectivity to api.telegram.org and retry".to_string()
            }
            BotError::TelegramError { code, .. } if *code == 401 || *code == 403 => {
                "Verify BOT_TOKEN with @BotFather, the current token was rejected".to_string()
            }
            BotError::TelegramError { .. } => {
                "Inspect the error description, the request itself was malformed or refused"
                    .to_string()
            }
            BotError::TooManyRequests { retry_after } => {
                format!("Wait at least {}s before the next request", retry_after)
            }
            BotError::IoError(_) => "Check file paths and permissions".to_string(),
            BotError::SerializationError(_) => {
                "The API returned an unexpected payload, check api_base_url".to_string()
            }
            BotError::ConfigError { .. } => "Review the configuration file syntax".to_string(),
            BotError::MissingConfigError { field } => {
                format!("Set {} via CLI flag, environment or config file", field)
            }
            BotError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of {}", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BotError::ApiError(_) => "Could not reach the Telegram API".to_string(),
            BotError::TelegramError { description, .. } => {
                format!("Telegram rejected the request: {}", description)
            }
            BotError::TooManyRequests { .. } => "Telegram is rate limiting the bot".to_string(),
            BotError::IoError(e) => format!("File access failed: {}", e),
            BotError::SerializationError(_) => "Unexpected response from the API".to_string(),
            BotError::ConfigError { message } => format!("Bad configuration: {}", message),
            BotError::MissingConfigError { field } => format!("{} is not set", field),
            BotError::InvalidConfigValueError { field, reason, .. } => {
                format!("{} is invalid: {}", field, reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_token_is_critical() {
        let err = BotError::TelegramError {
            code: 401,
            description: "Unauthorized".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("BotFather"));
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let err = BotError::TooManyRequests { retry_after: 7 };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("7s"));
    }

    #[test]
    fn test_missing_config_message_names_field() {
        let err = BotError::MissingConfigError {
            field: "REG_URL".to_string(),
        };
        assert_eq!(err.user_friendly_message(), "REG_URL is not set");
    }
}
