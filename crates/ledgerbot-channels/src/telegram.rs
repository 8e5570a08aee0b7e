use crate::channel::{Channel, ChannelEvent, InboundPhoto, InboundText};
use async_trait::async_trait;
use ledgerbot_core::{LedgerbotError, LedgerbotResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const LONG_POLL_SECS: u32 = 30;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram Bot API channel adapter.
///
/// Uses the Telegram Bot HTTP API for sending messages and long-polling
/// (`getUpdates`) for receiving them. Incoming text messages and photos
/// are forwarded through a `tokio::sync::mpsc` channel as
/// [`ChannelEvent`]s; photos are resolved through `getFile` and
/// downloaded before the event is emitted, so consumers only ever see
/// raw bytes.
pub struct TelegramChannel {
    bot_token: String,
    base_url: String,
    client: reqwest::Client,
    retry_delay: Duration,
    event_tx: mpsc::Sender<ChannelEvent>,
    event_rx: Option<mpsc::Receiver<ChannelEvent>>,
}

// ── Telegram API response types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessagePayload>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessagePayload {
    #[allow(dead_code)]
    message_id: i64,
    chat: TelegramChat,
    text: Option<String>,
    photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    file_id: String,
    #[allow(dead_code)]
    #[serde(default)]
    file_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TelegramFile {
    file_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

// ── Implementation ──────────────────────────────────────────────────────────

impl TelegramChannel {
    /// Create a new `TelegramChannel`.
    ///
    /// * `bot_token` – The bot token obtained from @BotFather.
    /// * `event_buffer` – Capacity of the internal mpsc event buffer.
    pub fn new(bot_token: impl Into<String>, event_buffer: usize) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, bot_token, event_buffer)
    }

    /// Like [`TelegramChannel::new`] with an explicit API base URL. Used
    /// by tests to point at a local mock server.
    pub fn with_base_url(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        event_buffer: usize,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(event_buffer);
        Self {
            bot_token: bot_token.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            retry_delay: DEFAULT_RETRY_DELAY,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Override how long [`TelegramChannel::poll_updates`] waits before
    /// retrying a failed poll. Used by tests to keep retries fast.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Take the receiving half of the event channel.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<ChannelEvent>> {
        self.event_rx.take()
    }

    /// Start long-polling the Telegram `getUpdates` endpoint.
    ///
    /// Runs until the event receiver is dropped, forwarding every
    /// incoming text message and photo as a [`ChannelEvent`]. Failed
    /// polls are logged and retried after a delay. Should be spawned
    /// onto a Tokio task.
    pub async fn poll_updates(&self) {
        let mut offset: Option<i64> = None;

        loop {
            match self.poll_once(offset).await {
                Ok((next_offset, receiver_open)) => {
                    offset = next_offset;
                    if !receiver_open {
                        return;
                    }
                }
                Err(e) => {
                    // The offset must survive the failure: Telegram only
                    // confirms a batch when the next request carries a
                    // higher offset, so restarting from `None` would
                    // re-deliver updates that were already forwarded.
                    tracing::error!(error = %e, "Telegram poll failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Fetch and forward one `getUpdates` batch.
    ///
    /// Returns the offset to use for the next poll and whether the event
    /// receiver is still attached.
    pub async fn poll_once(&self, offset: Option<i64>) -> LedgerbotResult<(Option<i64>, bool)> {
        let url = self.api_url("getUpdates");

        let mut params: Vec<(&str, String)> = vec![
            ("timeout", LONG_POLL_SECS.to_string()),
            ("allowed_updates", "[\"message\"]".to_string()),
        ];
        if let Some(off) = offset {
            params.push(("offset", off.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram poll error: {e}")))?;

        let body: TelegramResponse<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram parse error: {e}")))?;

        if !body.ok {
            return Err(LedgerbotError::Channel(format!(
                "Telegram API error: {}",
                body.description.unwrap_or_default()
            )));
        }

        let mut next_offset = offset;
        if let Some(updates) = body.result {
            for update in updates {
                // Advance the offset so we do not receive this update again.
                next_offset = Some(update.update_id + 1);

                let Some(msg) = update.message else { continue };
                let conversation_id = msg.chat.id.to_string();

                let event = if let Some(text) = msg.text {
                    ChannelEvent::Text(InboundText {
                        conversation_id,
                        text,
                    })
                } else if let Some(sizes) = msg.photo {
                    match self.fetch_photo(&sizes).await {
                        Ok(Some(bytes)) => ChannelEvent::Photo(InboundPhoto {
                            conversation_id,
                            bytes,
                        }),
                        Ok(None) => continue,
                        Err(e) => {
                            tracing::warn!(conversation = %conversation_id, error = %e, "Photo download failed");
                            continue;
                        }
                    }
                } else {
                    continue;
                };

                // Best-effort send; if the receiver is dropped we stop.
                if self.event_tx.send(event).await.is_err() {
                    return Ok((next_offset, false));
                }
            }
        }

        Ok((next_offset, true))
    }

    /// Resolve the largest size of a photo through `getFile` and download
    /// its bytes. Telegram lists sizes smallest first.
    async fn fetch_photo(&self, sizes: &[PhotoSize]) -> LedgerbotResult<Option<Vec<u8>>> {
        let Some(largest) = sizes.last() else {
            return Ok(None);
        };

        let url = self.api_url("getFile");
        let response = self
            .client
            .get(&url)
            .query(&[("file_id", largest.file_id.as_str())])
            .send()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram getFile error: {e}")))?;

        let body: TelegramResponse<TelegramFile> = response
            .json()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram parse error: {e}")))?;

        if !body.ok {
            return Err(LedgerbotError::Channel(format!(
                "Telegram getFile failed: {}",
                body.description.unwrap_or_default()
            )));
        }

        let Some(file_path) = body.result.and_then(|f| f.file_path) else {
            return Ok(None);
        };

        let file_url = format!("{}/file/bot{}/{}", self.base_url, self.bot_token, file_path);
        let bytes = self
            .client
            .get(&file_url)
            .send()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram download error: {e}")))?
            .bytes()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram download error: {e}")))?;

        Ok(Some(bytes.to_vec()))
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_text(&self, conversation_id: &str, text: &str) -> LedgerbotResult<()> {
        let url = self.api_url("sendMessage");

        let payload = SendMessageRequest {
            chat_id: conversation_id,
            text,
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram send error: {e}")))?;

        let body: TelegramResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| LedgerbotError::Channel(format!("Telegram parse error: {e}")))?;

        if !body.ok {
            return Err(LedgerbotError::Channel(format!(
                "Telegram sendMessage failed: {}",
                body.description.unwrap_or_default()
            )));
        }

        Ok(())
    }
}
