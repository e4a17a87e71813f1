use async_trait::async_trait;

use crate::application::ports::embedding_provider::ProviderError;
use crate::domain::entities::MessageRole;

/// One prior conversation turn rendered into the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTurn {
    pub role: MessageRole,
    pub content: String,
}

/// A role-tagged message for providers with a chat-message API.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

/// Outcome of retrieval for one assembled prompt. The two empty variants
/// render distinct notices so the model does not claim nothing was found
/// when material existed but would not fit.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptContext {
    /// Retrieved chunk text, highest score first.
    Chunks(String),
    /// No chunk scored above the similarity threshold.
    NoneRetrieved,
    /// Chunks were retrieved but every one was shed for the prompt budget.
    Oversized,
}

/// The assembled prompt. Semantic content and ordering are fixed: system
/// instruction, history oldest to newest, context block, current question.
/// Providers choose between the single-string and the role-tagged
/// serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub history: Vec<PromptTurn>,
    pub context: PromptContext,
    pub question: String,
}

const NO_CONTEXT_NOTICE: &str = "No relevant context was found in the uploaded documents. \
Tell the user that the documents do not contain enough information to answer this question.";

const OVERSIZED_CONTEXT_NOTICE: &str = "Relevant context was found in the uploaded documents \
but was too large to include here. Tell the user to ask a narrower question so the supporting \
material fits.";

impl Prompt {
    fn context_block(&self) -> String {
        match &self.context {
            PromptContext::Chunks(context) => format!("Context: {}", context),
            PromptContext::NoneRetrieved => NO_CONTEXT_NOTICE.to_string(),
            PromptContext::Oversized => OVERSIZED_CONTEXT_NOTICE.to_string(),
        }
    }

    /// The retrieved chunk text, if any survived assembly.
    pub fn context_text(&self) -> Option<&str> {
        match &self.context {
            PromptContext::Chunks(context) => Some(context),
            _ => None,
        }
    }

    /// Single-string serialization: instruction, history, context, question,
    /// joined by blank lines.
    pub fn render(&self) -> String {
        let mut parts = vec![self.system.clone()];
        for turn in &self.history {
            let speaker = match turn.role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            parts.push(format!("{}: {}", speaker, turn.content));
        }
        parts.push(self.context_block());
        parts.push(format!("Question: {}", self.question));
        parts.join("\n\n")
    }

    /// Role-tagged serialization: system message, history turns, then the
    /// context and question as the final user message.
    pub fn to_messages(&self) -> Vec<PromptMessage> {
        let mut messages = vec![PromptMessage {
            role: "system".to_string(),
            content: self.system.clone(),
        }];
        for turn in &self.history {
            messages.push(PromptMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }
        messages.push(PromptMessage {
            role: "user".to_string(),
            content: format!("{}\n\nQuestion: {}", self.context_block(), self.question),
        });
        messages
    }

    /// Total size in characters of the single-string rendering, the unit the
    /// prompt budget is measured in.
    pub fn char_count(&self) -> usize {
        self.render().chars().count()
    }
}

/// Sends a prompt to a language model and returns the generated text. Never
/// called with a blank question; the orchestrating service validates that.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prompt(context: PromptContext) -> Prompt {
        Prompt {
            system: "Answer only from context.".to_string(),
            history: vec![
                PromptTurn {
                    role: MessageRole::User,
                    content: "earlier question".to_string(),
                },
                PromptTurn {
                    role: MessageRole::Assistant,
                    content: "earlier answer".to_string(),
                },
            ],
            context,
            question: "what now?".to_string(),
        }
    }

    #[test]
    fn test_render_ordering() {
        let rendered = sample_prompt(PromptContext::Chunks("chunk text".to_string())).render();
        let system = rendered.find("Answer only from context.").unwrap();
        let history = rendered.find("User: earlier question").unwrap();
        let context = rendered.find("Context: chunk text").unwrap();
        let question = rendered.find("Question: what now?").unwrap();
        assert!(system < history && history < context && context < question);
    }

    #[test]
    fn test_missing_context_is_explicit() {
        let rendered = sample_prompt(PromptContext::NoneRetrieved).render();
        assert!(rendered.contains("No relevant context was found"));
        assert!(!rendered.contains("Context:"));
    }

    #[test]
    fn test_oversized_context_is_not_reported_as_missing() {
        let rendered = sample_prompt(PromptContext::Oversized).render();
        assert!(rendered.contains("too large to include"));
        assert!(!rendered.contains("No relevant context was found"));
    }

    #[test]
    fn test_message_serialization() {
        let messages = sample_prompt(PromptContext::Chunks("chunk text".to_string())).to_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].role, "user");
        assert!(messages[3].content.contains("Question: what now?"));
    }
}
