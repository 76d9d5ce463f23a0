//! Grounded answer generation: format retrieved chunks into a prompt, call
//! an OpenAI-compatible chat-completions endpoint, and report the outcome
//! as a [`Reply`].

pub mod client;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod reply;

pub use client::{ChatBackend, ChatClient, ChatMessage, ChatRequest};
pub use error::LlmError;
pub use generator::AnswerGenerator;
pub use pipeline::ShopAssistant;
pub use reply::{Reply, ReplyError, NO_ANSWER};
