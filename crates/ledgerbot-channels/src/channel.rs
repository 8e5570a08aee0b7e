use async_trait::async_trait;
use ledgerbot_core::LedgerbotResult;

/// A text message from a conversation.
#[derive(Debug, Clone)]
pub struct InboundText {
    /// Conversation (chat) the message came from.
    pub conversation_id: String,
    /// The message text.
    pub text: String,
}

/// A photo from a conversation, already downloaded.
#[derive(Debug, Clone)]
pub struct InboundPhoto {
    /// Conversation (chat) the photo came from.
    pub conversation_id: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// An inbound event from the messaging collaborator.
#[derive(Debug)]
pub enum ChannelEvent {
    /// A text message arrived.
    Text(InboundText),
    /// A photo arrived.
    Photo(InboundPhoto),
}

/// Outbound side of a messaging platform.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Platform name, e.g. `"telegram"`.
    fn name(&self) -> &str;

    /// Send a text reply into a conversation.
    async fn send_text(&self, conversation_id: &str, text: &str) -> LedgerbotResult<()>;
}
