//! Data models for normalized Codex CLI sessions.
//!
//! Both on-disk schemas (legacy and rollout) are parsed into these types:
//!
//! - [`Conversation`] - One session file: metadata plus ordered messages
//! - [`Message`] - A single user or assistant turn
//! - [`ContentPart`] - One typed fragment of a message body
//!
//! Conversations exclusively own their message sequence and are rebuilt
//! from disk on every query; nothing here is cached or shared.

pub mod conversation;

pub use conversation::{ContentPart, Conversation, Message, MessageBody, MessageKind};
