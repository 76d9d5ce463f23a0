use std::fmt;
use thiserror::Error;

use crate::error::LlmError;

pub const NO_ANSWER: &str = "Sorry, I don't have an answer for that.";

/// Outcome of answering one question. Exactly one of: an answer, the
/// canned no-context response, or a reported failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Answered(String),
    NoContext,
    Failed(ReplyError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplyError {
    #[error("{0}")]
    Retrieval(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl Reply {
    /// The string to show the user.
    pub fn text(&self) -> String {
        match self {
            Self::Answered(answer) => answer.clone(),
            Self::NoContext => NO_ANSWER.to_string(),
            Self::Failed(ReplyError::Llm(e)) => format!("⚠️ Error contacting the language model: {e}"),
            Self::Failed(e @ ReplyError::Retrieval(_)) => format!("⚠️ Error processing query: {e}"),
        }
    }

    pub fn is_answered(&self) -> bool { matches!(self, Self::Answered(_)) }

    pub fn is_failed(&self) -> bool { matches!(self, Self::Failed(_)) }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.text()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_display_text() {
        assert_eq!(Reply::Answered("Yes.".into()).text(), "Yes.");
        assert_eq!(Reply::NoContext.text(), NO_ANSWER);
        let timeout = Reply::Failed(LlmError::Timeout(30).into());
        assert_eq!(timeout.text(), "⚠️ Error contacting the language model: request timed out after 30s");
        let retrieval = Reply::Failed(ReplyError::Retrieval("index unavailable".into()));
        assert_eq!(retrieval.to_string(), "⚠️ Error processing query: index unavailable");
        assert!(timeout.is_failed() && !timeout.is_answered());
    }
}
