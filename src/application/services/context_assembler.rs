use crate::application::ports::response_generator::{Prompt, PromptContext, PromptTurn};
use crate::domain::entities::Message;
use crate::domain::repositories::ScoredChunk;

const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that answers questions based on \
the provided document context. Always base your answers on the given context. If the context \
does not contain enough information to answer the question, say so clearly. Be concise but \
comprehensive, and use markdown formatting when appropriate.";

/// Builds a bounded prompt from the query, the ranked retrieval results and
/// the conversation history.
///
/// History is a sliding window of the most recent `max_history` messages;
/// older turns are dropped, never summarized, which bounds prompt growth at
/// the cost of long-range context. When the character budget is exceeded,
/// the lowest-ranked chunks are dropped first; history turns (oldest first)
/// go only after every chunk is gone, since grounding context outranks
/// conversational recency.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    max_history: usize,
    max_prompt_chars: usize,
}

impl ContextAssembler {
    pub const DEFAULT_MAX_HISTORY: usize = 5;
    pub const DEFAULT_MAX_PROMPT_CHARS: usize = 12_000;

    pub fn new(max_history: usize, max_prompt_chars: usize) -> Self {
        Self {
            max_history,
            max_prompt_chars,
        }
    }

    pub fn assemble(
        &self,
        query: &str,
        ranked_chunks: &[ScoredChunk],
        history: &[Message],
    ) -> Prompt {
        let window_start = history.len().saturating_sub(self.max_history);
        let mut turns: Vec<PromptTurn> = history[window_start..]
            .iter()
            .map(|message| PromptTurn {
                role: message.role(),
                content: message.content().to_string(),
            })
            .collect();

        let mut kept_chunks = ranked_chunks.len();
        let mut prompt = self.build(query, ranked_chunks, kept_chunks, &turns);

        // Shed lowest-ranked chunks until the prompt fits.
        while prompt.char_count() > self.max_prompt_chars && kept_chunks > 0 {
            kept_chunks -= 1;
            prompt = self.build(query, ranked_chunks, kept_chunks, &turns);
        }

        // Only with zero chunks left may history be shed, oldest first.
        while prompt.char_count() > self.max_prompt_chars && !turns.is_empty() {
            turns.remove(0);
            prompt = self.build(query, ranked_chunks, kept_chunks, &turns);
        }

        prompt
    }

    fn build(
        &self,
        query: &str,
        ranked_chunks: &[ScoredChunk],
        kept_chunks: usize,
        turns: &[PromptTurn],
    ) -> Prompt {
        let context = if kept_chunks > 0 {
            PromptContext::Chunks(
                ranked_chunks[..kept_chunks]
                    .iter()
                    .map(|scored| scored.chunk.text())
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            )
        } else if ranked_chunks.is_empty() {
            PromptContext::NoneRetrieved
        } else {
            // Material existed but none of it fit the budget; the rendered
            // notice must not claim retrieval came up empty.
            PromptContext::Oversized
        };

        Prompt {
            system: SYSTEM_INSTRUCTION.to_string(),
            history: turns.to_vec(),
            context,
            question: query.to_string(),
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_HISTORY, Self::DEFAULT_MAX_PROMPT_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Chunk, MessageRole};
    use pgvector::Vector;
    use uuid::Uuid;

    fn scored(text: &str, score: f32, index: i32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(
                Uuid::new_v4(),
                index,
                text.to_string(),
                Vector::from(vec![0.0, 1.0]),
            ),
            score,
        }
    }

    fn user_message(content: &str) -> Message {
        Message::new(MessageRole::User, content.to_string())
    }

    #[test]
    fn test_history_window_keeps_most_recent() {
        let assembler = ContextAssembler::new(2, 100_000);
        let history: Vec<Message> = (0..6).map(|i| user_message(&format!("turn {}", i))).collect();

        let prompt = assembler.assemble("q", &[scored("ctx", 0.9, 0)], &history);

        assert_eq!(prompt.history.len(), 2);
        assert_eq!(prompt.history[0].content, "turn 4");
        assert_eq!(prompt.history[1].content, "turn 5");
    }

    #[test]
    fn test_empty_retrieval_produces_no_context_prompt() {
        let assembler = ContextAssembler::default();
        let prompt = assembler.assemble("q", &[], &[]);

        assert_eq!(prompt.context, PromptContext::NoneRetrieved);
        assert!(prompt.render().contains("No relevant context was found"));
    }

    #[test]
    fn test_context_preserves_rank_order() {
        let assembler = ContextAssembler::default();
        let chunks = vec![scored("best", 0.95, 7), scored("good", 0.8, 2), scored("ok", 0.71, 5)];

        let prompt = assembler.assemble("q", &chunks, &[]);
        let context = prompt.context_text().unwrap();
        let best = context.find("best").unwrap();
        let good = context.find("good").unwrap();
        let ok = context.find("ok").unwrap();
        assert!(best < good && good < ok);
    }

    #[test]
    fn test_budget_drops_lowest_ranked_chunks_first() {
        let big = "x".repeat(400);
        let chunks = vec![
            scored(&big, 0.95, 0),
            scored(&big, 0.9, 1),
            scored("tail chunk", 0.8, 2),
        ];
        let history = vec![user_message("keep this turn")];

        // Budget fits system+history+question plus roughly one big chunk.
        let assembler = ContextAssembler::new(5, 900);
        let prompt = assembler.assemble("q", &chunks, &history);

        let context = prompt.context_text().expect("highest ranked chunk should survive");
        assert!(context.contains(&big));
        assert!(!context.contains("tail chunk"));
        // History must be intact while any chunk could still be dropped.
        assert_eq!(prompt.history.len(), 1);
    }

    #[test]
    fn test_history_dropped_only_after_all_chunks() {
        let chunks = vec![scored(&"x".repeat(500), 0.9, 0)];
        let history: Vec<Message> =
            (0..4).map(|i| user_message(&format!("history turn number {}", i))).collect();

        // Too small for any chunk; history must shrink oldest-first.
        let assembler = ContextAssembler::new(5, 620);
        let prompt = assembler.assemble("q", &chunks, &history);

        assert_eq!(prompt.context, PromptContext::Oversized);
        assert!(!prompt.history.is_empty());
        assert_eq!(
            prompt.history.last().unwrap().content,
            "history turn number 3"
        );
    }

    #[test]
    fn test_budget_exhausted_context_renders_oversized_notice() {
        let chunks = vec![scored(&"z".repeat(800), 0.9, 0)];

        // Budget too small for the chunk, but retrieval was not empty.
        let assembler = ContextAssembler::new(5, 600);
        let prompt = assembler.assemble("q", &chunks, &[]);

        assert_eq!(prompt.context, PromptContext::Oversized);
        let rendered = prompt.render();
        assert!(rendered.contains("too large to include"));
        assert!(!rendered.contains("No relevant context was found"));
    }

    #[test]
    fn test_fits_within_budget() {
        let chunks: Vec<ScoredChunk> =
            (0..10).map(|i| scored(&"y".repeat(300), 0.9, i)).collect();
        let history: Vec<Message> = (0..5).map(|i| user_message(&format!("turn {}", i))).collect();

        let assembler = ContextAssembler::new(5, 1500);
        let prompt = assembler.assemble("q", &chunks, &history);
        assert!(prompt.char_count() <= 1500);
    }
}
