use crate::core::dispatcher::default_commands;
use crate::domain::model::User;
use crate::domain::ports::{TelegramApi, UpdateHandler};
use crate::utils::error::{BotError, Result};
use crate::utils::monitor::SystemMonitor;
use std::time::Duration;
use tokio::sync::watch;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Drives the long-polling loop: fetch a batch, hand every update to the
/// handler, send the produced replies, advance the offset.
pub struct BotEngine<A: TelegramApi, H: UpdateHandler> {
    api: A,
    handler: H,
    poll_timeout_secs: u64,
    monitor: SystemMonitor,
}

impl<A: TelegramApi, H: UpdateHandler> BotEngine<A, H> {
    pub fn new(api: A, handler: H, poll_timeout_secs: u64) -> Self {
        Self::new_with_monitoring(api, handler, poll_timeout_secs, false)
    }

    pub fn new_with_monitoring(
        api: A,
        handler: H,
        poll_timeout_secs: u64,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            api,
            handler,
            poll_timeout_secs,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Pre-polling handshake. Polling must not start when the token is dead
    /// or the command menu cannot be registered.
    pub async fn startup(&self) -> Result<User> {
        let me = self.api.get_me().await?;
        tracing::info!(
            "🤖 Authorized as @{}",
            me.username.as_deref().unwrap_or(&me.first_name)
        );

        self.api.set_my_commands(&default_commands()).await?;
        tracing::info!("✅ Bot commands registered");

        Ok(me)
    }

    /// One `getUpdates` round. Returns the offset for the next round;
    /// a failed send for one chat does not abort the rest of the batch.
    pub async fn poll_once(&self, offset: Option<i64>) -> Result<Option<i64>> {
        let updates = self.api.get_updates(offset, self.poll_timeout_secs).await?;
        if updates.is_empty() {
            return Ok(offset);
        }

        tracing::debug!("📨 Received {} update(s)", updates.len());
        let mut next_offset = offset;

        for update in &updates {
            let confirmed = update.update_id + 1;
            if next_offset.map_or(true, |current| confirmed > current) {
                next_offset = Some(confirmed);
            }

            match self.handler.handle(update).await {
                Ok(replies) => {
                    for reply in replies {
                        if let Err(e) = self.api.send_message(&reply).await {
                            tracing::warn!(
                                "⚠️ Failed to send reply to chat {}: {}",
                                reply.chat_id,
                                e
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("⚠️ Handler failed for update {}: {}", update.update_id, e)
                }
            }

            self.monitor.record_update();
        }

        self.monitor.log_stats("poll");
        Ok(next_offset)
    }

    /// Polls until `shutdown` flips. Transient errors back off exponentially
    /// (capped), rate limits honor the server-provided delay; both sleeps
    /// stay interruptible by shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        if *shutdown.borrow() {
            return Ok(());
        }

        tracing::info!(
            "📡 Starting long polling (timeout {}s)",
            self.poll_timeout_secs
        );

        let mut offset = None;
        let mut backoff = INITIAL_BACKOFF;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                polled = self.poll_once(offset) => match polled {
                    Ok(next_offset) => {
                        offset = next_offset;
                        backoff = INITIAL_BACKOFF;
                    }
                    Err(BotError::TooManyRequests { retry_after }) => {
                        tracing::warn!("⏳ Rate limited, sleeping {}s", retry_after);
                        if interrupted_by_shutdown(Duration::from_secs(retry_after), &mut shutdown).await {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Polling failed: {} (retrying in {:?})", e, backoff);
                        if interrupted_by_shutdown(backoff, &mut shutdown).await {
                            break;
                        }
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                    }
                }
            }
        }

        self.monitor.log_final_stats();
        tracing::info!("🛑 Polling stopped");
        Ok(())
    }
}

async fn interrupted_by_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = shutdown.changed() => true,
    }
}
