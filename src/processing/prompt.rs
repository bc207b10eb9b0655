//! Prompt assembly for the retrieve-then-generate protocol.

/// Join retrieved chunks, nearest first, into the context block fed to the model.
pub fn build_context(chunks: &[&str]) -> String {
    chunks.join("\n\n")
}

/// Assemble the grounding prompt for a question.
///
/// The model is instructed to answer strictly from the supplied context and to say so
/// when the context does not contain the answer.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful Q&A assistant. Use the following pieces of context from a document to answer the user's question.\n\
         If the answer is not contained within the provided text, state that you cannot find the answer in the document.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_joins_chunks_with_blank_lines() {
        let context = build_context(&["first", "second", "third"]);
        assert_eq!(context, "first\n\nsecond\n\nthird");
    }

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = build_prompt("Paris is the capital of France.", "What is the capital?");
        assert!(prompt.contains("Context:\nParis is the capital of France."));
        assert!(prompt.contains("Question: What is the capital?"));
        assert!(prompt.ends_with("Answer:"));
        assert!(prompt.contains("cannot find the answer"));
    }
}
