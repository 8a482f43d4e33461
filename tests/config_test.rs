use anyhow::Result;
use fenix_bot::config::{CliConfig, DEFAULT_API_BASE_URL, DEFAULT_POLL_TIMEOUT_SECS};
use fenix_bot::utils::error::BotError;
use fenix_bot::utils::validation::Validate;
use std::io::Write;
use tempfile::NamedTempFile;

fn cli(token: Option<&str>, reg_url: Option<&str>) -> CliConfig {
    CliConfig {
        token: token.map(str::to_string),
        reg_url: reg_url.map(str::to_string),
        api_base_url: None,
        poll_timeout: None,
        config: None,
        verbose: false,
        monitor: false,
        log_json: false,
        dry_run: false,
    }
}

// These tests never set BOT_TOKEN/REG_URL; they clear them so a value
// leaking in from the host environment cannot mask a failure.
fn clear_bot_env() {
    std::env::remove_var("BOT_TOKEN");
    std::env::remove_var("TELEGRAM_BOT_TOKEN");
    std::env::remove_var("REG_URL");
}

#[test]
fn test_resolve_from_flags_applies_defaults() -> Result<()> {
    let config = cli(Some("123456:secret"), Some("https://fenix.example/register")).resolve()?;

    assert_eq!(config.token, "123456:secret");
    assert_eq!(config.registration_url, "https://fenix.example/register");
    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.poll_timeout_secs, DEFAULT_POLL_TIMEOUT_SECS);
    config.validate()?;
    Ok(())
}

#[test]
fn test_missing_token_is_reported() {
    clear_bot_env();

    let err = cli(None, Some("https://fenix.example/register"))
        .resolve()
        .unwrap_err();

    match err {
        BotError::MissingConfigError { field } => assert!(field.contains("BOT_TOKEN")),
        other => panic!("expected MissingConfigError, got {:?}", other),
    }
}

#[test]
fn test_missing_registration_url_is_reported() {
    clear_bot_env();

    let err = cli(Some("123456:secret"), None).resolve().unwrap_err();

    match err {
        BotError::MissingConfigError { field } => assert!(field.contains("REG_URL")),
        other => panic!("expected MissingConfigError, got {:?}", other),
    }
}

#[test]
fn test_config_file_fills_missing_values() -> Result<()> {
    clear_bot_env();

    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[bot]
token = "987654:from-file"
registration_url = "https://fenix.example/from-file"

[polling]
timeout_seconds = 15
"#
    )?;

    let mut args = cli(None, None);
    args.config = Some(file.path().to_str().unwrap().to_string());

    let config = args.resolve()?;
    assert_eq!(config.token, "987654:from-file");
    assert_eq!(config.registration_url, "https://fenix.example/from-file");
    assert_eq!(config.poll_timeout_secs, 15);
    Ok(())
}

#[test]
fn test_cli_flag_wins_over_config_file() -> Result<()> {
    clear_bot_env();

    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[bot]
token = "987654:from-file"
registration_url = "https://fenix.example/from-file"
"#
    )?;

    let mut args = cli(Some("111:from-flag"), None);
    args.config = Some(file.path().to_str().unwrap().to_string());

    let config = args.resolve()?;
    assert_eq!(config.token, "111:from-flag");
    assert_eq!(config.registration_url, "https://fenix.example/from-file");
    Ok(())
}

#[test]
fn test_resolved_config_still_goes_through_validation() {
    clear_bot_env();

    // resolve() only merges; a syntactically present but bogus value is
    // caught by validate(), before any network traffic
    let config = cli(Some("not-a-token"), Some("ftp://fenix.example"))
        .resolve()
        .unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_config_file_fails_resolution() {
    let mut args = cli(Some("123456:secret"), Some("https://fenix.example/register"));
    args.config = Some("/nonexistent/fenix-bot.toml".to_string());

    assert!(matches!(
        args.resolve().unwrap_err(),
        BotError::IoError(_)
    ));
}
