use crate::utils::error::{BotError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => {
            match url.scheme() {
                "http" | "https" => {}
                scheme => {
                    return Err(BotError::InvalidConfigValueError {
                        field: field_name.to_string(),
                        value: url_str.to_string(),
                        reason: format!("Unsupported URL scheme: {}", scheme),
                    })
                }
            }
            if url.host_str().map_or(true, str::is_empty) {
                return Err(BotError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: url_str.to_string(),
                    reason: "URL has no host".to_string(),
                });
            }
            Ok(())
        }
        Err(e) => Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Bot tokens look like `<numeric id>:<secret>`. Only the shape is checked
/// here; whether the token is live is `getMe`'s job.
pub fn validate_token(field_name: &str, token: &str) -> Result<()> {
    validate_non_empty_string(field_name, token)?;

    let invalid = |reason: &str| BotError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: mask_token(token),
        reason: reason.to_string(),
    };

    let (id, secret) = token
        .split_once(':')
        .ok_or_else(|| invalid("Token must contain ':'"))?;

    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("Token must start with a numeric bot id"));
    }
    if secret.is_empty() || secret.contains(char::is_whitespace) {
        return Err(invalid("Token secret part is malformed"));
    }

    Ok(())
}

/// Tokens never go into error messages or logs in full.
pub fn mask_token(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) => format!("{}:***", id),
        None => "***".to_string(),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
