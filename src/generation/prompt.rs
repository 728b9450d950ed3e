//! Prompt templates for grounded answer generation

use crate::index::ScoredChunk;

/// Stateless prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunks best-first, separated by a blank line.
    ///
    /// Callers must not pass an empty slice; the service reports
    /// `NoRelevantContent` before composing a prompt.
    pub fn build_context(chunks: &[ScoredChunk]) -> String {
        debug_assert!(!chunks.is_empty(), "composing a prompt with no context");
        chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the grounded prompt: context-only restriction, an explicit
    /// not-in-context instruction, and the literal question after the
    /// context block.
    pub fn build_grounded_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Answer the question using ONLY the document content provided below.

RULES:
1. Use only information that is explicitly stated in the context.
2. If the answer is not present in the context, say so plainly: "The answer is not available in the provided document."
3. Do not use outside knowledge and do not guess.

CONTEXT:
{context}

QUESTION: {question}

Answer:"#,
            context = context,
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(texts: &[&str]) -> Vec<ScoredChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| ScoredChunk {
                text: t.to_string(),
                score: 1.0 / (i as f32 + 1.0),
            })
            .collect()
    }

    #[test]
    fn context_preserves_order_with_blank_lines() {
        let context = PromptBuilder::build_context(&scored(&["best", "second", "third"]));
        assert_eq!(context, "best\n\nsecond\n\nthird");
    }

    #[test]
    fn prompt_carries_context_then_question() {
        let prompt = PromptBuilder::build_grounded_prompt(
            "how to install?",
            "Installation requires admin rights.",
        );
        let context_pos = prompt.find("Installation requires admin rights.").unwrap();
        let question_pos = prompt.find("how to install?").unwrap();
        assert!(context_pos < question_pos);
        assert!(prompt.contains("not available in the provided document"));
    }
}
