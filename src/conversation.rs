//! Conversation transcript storage.
//!
//! Messages are append-only and rendered at insertion time; ordering is
//! arrival order. A single loading placeholder may exist while a chat
//! request is in flight, and is removed exactly once when the request
//! resolves or fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::markdown;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    /// The person typing, dictating, or uploading.
    #[serde(rename = "user")]
    User,
    /// The backend assistant.
    #[serde(rename = "ai")]
    Assistant,
}

/// A rendered conversation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Stable identifier, assigned on append.
    pub id: String,
    /// Message author.
    pub sender: Sender,
    /// Rendered HTML body (inline markdown already applied).
    /// Empty for image-only entries.
    pub html: String,
    /// Image source path for image entries.
    pub image_src: Option<String>,
    /// Audio resource reference for spoken assistant replies.
    pub audio_url: Option<String>,
    /// True while this entry is the awaiting-response placeholder.
    pub loading: bool,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

/// Append-only conversation transcript.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
    scroll_generation: u64,
    placeholder: Option<String>,
}

impl Conversation {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text message. The body is rendered through the inline
    /// markdown subset before storage.
    pub fn push_text(&mut self, sender: Sender, text: &str) -> &Message {
        self.push_message(sender, text, None)
    }

    /// Append a text message with an optional audio reference.
    pub fn push_message(
        &mut self,
        sender: Sender,
        text: &str,
        audio_url: Option<String>,
    ) -> &Message {
        let message = Message {
            id: self.allocate_id(),
            sender,
            html: markdown::render_inline(text),
            image_src: None,
            audio_url,
            loading: false,
            timestamp: Utc::now(),
        };
        self.append(message)
    }

    /// Append an image-only entry on the user side.
    pub fn push_image(&mut self, src: String) -> &Message {
        let message = Message {
            id: self.allocate_id(),
            sender: Sender::User,
            html: String::new(),
            image_src: Some(src),
            audio_url: None,
            loading: false,
            timestamp: Utc::now(),
        };
        self.append(message)
    }

    /// Append the awaiting-response placeholder and remember it for
    /// later removal. An unresolved placeholder left over from a broken
    /// caller sequence is removed first.
    pub fn begin_placeholder(&mut self) -> String {
        if self.placeholder.is_some() {
            warn!("placeholder already present; replacing it");
            self.take_placeholder();
        }
        let id = self.allocate_id();
        let message = Message {
            id: id.clone(),
            sender: Sender::Assistant,
            html: "...".to_owned(),
            image_src: None,
            audio_url: None,
            loading: true,
            timestamp: Utc::now(),
        };
        self.append(message);
        self.placeholder = Some(id.clone());
        id
    }

    /// Remove the outstanding placeholder. Returns true if one existed.
    pub fn take_placeholder(&mut self) -> bool {
        let Some(id) = self.placeholder.take() else {
            return false;
        };
        self.messages.retain(|m| m.id != id);
        true
    }

    /// Whether a placeholder is currently outstanding.
    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Bumped on every append; hosts scroll to the newest entry when it
    /// changes.
    #[must_use]
    pub fn scroll_generation(&self) -> u64 {
        self.scroll_generation
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn allocate_id(&mut self) -> String {
        let id = format!("msg_{}", self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        self.scroll_generation += 1;
        let newest = self.messages.len() - 1;
        &self.messages[newest]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn order_equals_arrival_order() {
        let mut conversation = Conversation::new();
        conversation.push_text(Sender::User, "first");
        conversation.push_text(Sender::Assistant, "second");
        conversation.push_text(Sender::User, "third");

        let texts: Vec<&str> = conversation
            .messages()
            .iter()
            .map(|m| m.html.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn scroll_generation_bumps_on_every_append() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.scroll_generation(), 0);

        conversation.push_text(Sender::User, "one");
        assert_eq!(conversation.scroll_generation(), 1);

        conversation.push_image("/uploads/x.png".to_owned());
        assert_eq!(conversation.scroll_generation(), 2);

        conversation.begin_placeholder();
        assert_eq!(conversation.scroll_generation(), 3);
    }

    #[test]
    fn markdown_applied_at_append() {
        let mut conversation = Conversation::new();
        let message = conversation.push_text(Sender::Assistant, "**hi**");
        assert_eq!(message.html, "<strong>hi</strong>");
    }

    #[test]
    fn image_variant() {
        let mut conversation = Conversation::new();
        let message = conversation.push_image("/uploads/cat.png".to_owned());
        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.image_src.as_deref(), Some("/uploads/cat.png"));
        assert!(message.html.is_empty());
    }

    #[test]
    fn placeholder_exactly_once() {
        let mut conversation = Conversation::new();
        conversation.push_text(Sender::User, "hello");
        conversation.begin_placeholder();

        assert!(conversation.has_placeholder());
        assert_eq!(conversation.len(), 2);
        assert!(conversation.messages()[1].loading);

        assert!(conversation.take_placeholder());
        assert!(!conversation.has_placeholder());
        assert_eq!(conversation.len(), 1);

        // A second removal is a no-op.
        assert!(!conversation.take_placeholder());
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn stale_placeholder_is_replaced_not_duplicated() {
        let mut conversation = Conversation::new();
        conversation.begin_placeholder();
        conversation.begin_placeholder();

        let loading = conversation.messages().iter().filter(|m| m.loading).count();
        assert_eq!(loading, 1);
    }

    #[test]
    fn ids_are_stable_and_unique() {
        let mut conversation = Conversation::new();
        let first = conversation.push_text(Sender::User, "a").id.clone();
        let second = conversation.push_text(Sender::User, "b").id.clone();
        assert_ne!(first, second);
        assert_eq!(conversation.messages()[0].id, first);
    }
}
