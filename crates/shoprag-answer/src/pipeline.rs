use tracing::warn;

use shoprag_core::traits::Retrieve;
use shoprag_core::types::SearchHit;

use crate::client::ChatBackend;
use crate::generator::AnswerGenerator;
use crate::reply::{Reply, ReplyError};

/// Retrieve, format, prompt, generate. Built once with its retriever and
/// generator and then queried any number of times.
pub struct ShopAssistant<R, B> {
    retriever: R,
    generator: AnswerGenerator<B>,
    top_k: usize,
}

impl<R: Retrieve, B: ChatBackend> ShopAssistant<R, B> {
    pub fn new(retriever: R, generator: AnswerGenerator<B>, top_k: usize) -> Self {
        Self { retriever, generator, top_k: top_k.max(1) }
    }

    pub fn top_k(&self) -> usize { self.top_k }

    pub fn retriever(&self) -> &R { &self.retriever }

    pub fn generator(&self) -> &AnswerGenerator<B> { &self.generator }

    pub fn sources(&self, question: &str) -> anyhow::Result<Vec<SearchHit>> {
        self.retriever.retrieve(question, self.top_k)
    }

    pub async fn ask(&self, question: &str) -> Reply {
        self.ask_with_sources(question).await.0
    }

    /// Like [`ask`](Self::ask), also returning the hits the answer was
    /// grounded on.
    pub async fn ask_with_sources(&self, question: &str) -> (Reply, Vec<SearchHit>) {
        match self.sources(question) {
            Ok(hits) => {
                let reply = self.generator.generate(question, &hits).await;
                (reply, hits)
            }
            Err(e) => {
                warn!(error = %e, "retrieval failed");
                (Reply::Failed(ReplyError::Retrieval(format!("{e:#}"))), Vec::new())
            }
        }
    }
}
