//! Palaver: a voice-enabled chat client engine.
//!
//! This crate implements the controller behind a chat surface: typed
//! text, dictated speech, and uploaded images are reconciled into chat
//! submissions against a backend HTTP API, and the conversation is
//! maintained as an ordered, append-only transcript with inline markdown
//! and per-message audio transport.
//!
//! # Architecture
//!
//! A single [`ChatController`] owns independent state machines:
//! - **Composer**: input acquisition and the press/hold/release
//!   dictation lock (`composer`)
//! - **Conversation**: append-only transcript, placeholder lifecycle
//!   (`conversation`)
//! - **PlaybackWidget**: per-message audio transport over an injected
//!   sink (`audio`)
//! - **ApiClient**: upload / chat / history calls over HTTP (`api`)
//!
//! Platform capabilities (speech capture, media playback, durable
//! preference storage) sit behind narrow traits so the state machines
//! can be exercised without hardware. Hosts drive the controller with
//! input events and render from its state, reacting to [`UiEvent`]s
//! emitted over an async channel.

pub mod api;
pub mod audio;
pub mod composer;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod dictation;
pub mod error;
pub mod event;
pub mod markdown;
pub mod theme;

pub use config::ClientConfig;
pub use controller::{ChatController, FALLBACK_REPLY};
pub use error::{ClientError, Result};
pub use event::UiEvent;
pub use theme::Theme;
