use clap::Parser;
use fenix_bot::config::CliConfig;
use fenix_bot::utils::error::{BotError, ErrorSeverity};
use fenix_bot::utils::validation::{mask_token, Validate};
use fenix_bot::utils::logger;
use fenix_bot::{BotEngine, RegistrationDispatcher, TelegramClient};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting fenix-bot");

    // 解析並驗證配置
    let file = match cli.load_file() {
        Ok(file) => file,
        Err(e) => {
            tracing::error!("❌ Failed to load config file: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let config = match cli.resolve_with(file.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration error: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated");
    tracing::debug!(
        "Using token {}, API base {}, poll timeout {}s",
        mask_token(&config.token),
        config.api_base_url,
        config.poll_timeout_secs
    );

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - configuration is valid, not starting the bot");
        println!("✅ Configuration is valid");
        return Ok(());
    }

    let monitor_enabled = cli.monitor || file.as_ref().map_or(false, |f| f.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 組裝 API client、dispatcher 與輪詢引擎
    let api = TelegramClient::from_config(&config);
    let dispatcher = RegistrationDispatcher::new(config.clone());
    let engine =
        BotEngine::new_with_monitoring(api, dispatcher, config.poll_timeout_secs, monitor_enabled);

    // Polling must not start if the handshake fails
    if let Err(e) = engine.startup().await {
        tracing::error!("❌ Startup failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code_for(&e));
    }

    // SIGINT/SIGTERM 轉成 watch 訊號,輪詢迴圈據此收尾
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("🛑 Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    match engine.run(shutdown_rx).await {
        Ok(()) => {
            tracing::info!("✅ fenix-bot stopped cleanly");
        }
        Err(e) => {
            tracing::error!("❌ Polling loop failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = exit_code_for(&e);
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn exit_code_for(e: &BotError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let sigterm = signal(SignalKind::terminate());
    match sigterm {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            // SIGTERM 註冊失敗時至少還有 Ctrl-C
            tracing::warn!("⚠️ Could not install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
