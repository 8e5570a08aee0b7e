//! Messaging channel abstraction.
//!
//! Inbound text and photo events arrive from the messaging collaborator
//! through a `tokio::sync::mpsc` channel; outbound replies go through the
//! [`Channel`] trait. [`TelegramChannel`] is the Telegram Bot API
//! implementation.
//!
//! The channel delivers events for one conversation in arrival order; the
//! consumer of the event receiver is responsible for not reordering them.

/// Core channel trait and event types.
pub mod channel;
/// Telegram channel integration.
pub mod telegram;

pub use channel::{Channel, ChannelEvent, InboundPhoto, InboundText};
pub use telegram::TelegramChannel;
