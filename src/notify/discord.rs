// =============================================================================
// Discord Webhook Notifier
// =============================================================================
//
// Posts a single embed per signal.  Delivery is best-effort: an empty webhook
// URL disables sending, and transport or HTTP errors are logged, never
// returned, so a broken webhook cannot stop the evaluation loop.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
}

/// Best-effort Discord webhook sender.
#[derive(Clone)]
pub struct DiscordNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    /// Create a notifier; an empty `webhook_url` turns [`send`](Self::send)
    /// into a no-op.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client for DiscordNotifier")?;
        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    /// Post one embed.  Never fails.
    #[instrument(skip(self, description), name = "discord::send")]
    pub async fn send(&self, title: &str, description: &str, color: u32) {
        if !self.is_enabled() {
            debug!("no webhook configured, skipping notification");
            return;
        }

        let payload = build_payload(title, description, color);
        let result = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                info!("notification delivered");
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                warn!(%status, body = %body, "webhook rejected notification");
            }
            Err(e) => {
                warn!(error = %e, "webhook delivery failed");
            }
        }
    }
}

fn build_payload<'a>(title: &'a str, description: &'a str, color: u32) -> WebhookPayload<'a> {
    WebhookPayload {
        embeds: [Embed {
            title,
            description,
            color,
        }],
    }
}

impl std::fmt::Debug for DiscordNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The webhook URL embeds its secret token.
        f.debug_struct("DiscordNotifier")
            .field("webhook_url", &if self.is_enabled() { "<redacted>" } else { "<unset>" })
            .finish()
    }
}
