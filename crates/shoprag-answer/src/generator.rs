use tracing::{debug, warn};

use shoprag_core::config::LlmSettings;
use shoprag_core::types::SearchHit;

use crate::client::{ChatBackend, ChatMessage, ChatRequest};
use crate::prompt::{build_prompt, format_context};
use crate::reply::{Reply, ReplyError};

/// Turns a question plus retrieved chunks into a [`Reply`].
pub struct AnswerGenerator<B> {
    backend: B,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl<B: ChatBackend> AnswerGenerator<B> {
    pub fn new(backend: B, settings: &LlmSettings) -> Self {
        Self {
            backend,
            model: settings.model.clone(),
            temperature: settings.temperature,
            system_prompt: settings.system_prompt.clone(),
        }
    }

    pub fn backend(&self) -> &B { &self.backend }

    pub fn model(&self) -> &str { &self.model }

    pub fn request_for(&self, question: &str, hits: &[SearchHit]) -> ChatRequest {
        let prompt = build_prompt(question, &format_context(hits));
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(self.system_prompt.as_str()), ChatMessage::user(prompt)],
            temperature: self.temperature,
        }
    }

    /// No hits short-circuits to [`Reply::NoContext`] without contacting the
    /// model. Backend failures come back as [`Reply::Failed`].
    pub async fn generate(&self, question: &str, hits: &[SearchHit]) -> Reply {
        if hits.is_empty() {
            debug!("no retrieval hits, skipping generation");
            return Reply::NoContext;
        }
        let request = self.request_for(question, hits);
        match self.backend.complete(&request).await {
            Ok(answer) => Reply::Answered(answer),
            Err(e) => {
                warn!(error = %e, model = %self.model, "generation failed");
                Reply::Failed(ReplyError::Llm(e))
            }
        }
    }
}
