//! Fixed prompt texts for the assistant

use super::context::render_context;
use crate::knowledge::Document;

pub const GENERAL_CHAT_PROMPT: &str =
    "You are the AI assistant of the enterprise knowledge base. Chat with the user in a friendly way.";

pub const HELP_MESSAGE: &str = "I am the AI assistant of the enterprise knowledge base. I can help you:

🔍 **Search documents** - tell me what you are looking for and I will search for it
📖 **Answer questions** - answer your questions based on documents in the knowledge base
💡 **Recommend content** - suggest relevant documents for your needs

Try asking me:
- \"Find documents about XX\"
- \"What is the company's XX process\"
- \"Materials related to the XX project\"";

pub const DOCUMENT_UNAVAILABLE_MESSAGE: &str =
    "Sorry, the content of this document could not be retrieved.";

pub const SELECT_DOCUMENTS_MESSAGE: &str =
    "Please select the documents you want to use as references first.";

const GENERAL_ASSISTANT_PROMPT: &str = "You are the AI assistant of the enterprise knowledge base. You can help users:
1. Answer questions about knowledge management
2. Suggest how to organise and categorise documents
3. Answer general work questions
4. Provide technical support and guidance

Answer in a professional and friendly manner.";

/// System prompt for search-backed answers; `context_block` may be empty
pub fn retrieval_prompt(context_block: &str) -> String {
    let mut prompt = String::from(
        "You are the AI assistant of the enterprise knowledge base. Your task is to answer the \
         user's question based on the provided documents.

Rules:
1. Prefer the retrieved document content when answering
2. If the documents contain relevant information, cite the source (for example \"According to the document 'XX'...\")
3. If the documents contain no relevant information, say so honestly and give general guidance
4. Keep answers concise, accurate and well organised
5. You may use markdown to make the answer clearer
",
    );

    if !context_block.is_empty() {
        prompt.push_str("\n\nRelevant documents retrieved from the knowledge base:\n\n");
        prompt.push_str(context_block);
    }
    prompt
}

/// System prompt for questions about one explicitly chosen document
pub fn single_document_prompt(document: &Document) -> String {
    format!(
        "You are a professional document Q&A assistant. Your task is to answer the user's \
         question based on the provided document.

{}
Rules:
1. Answer only from the provided document content; do not make up information
2. If the document contains no relevant information, tell the user clearly
3. Keep answers concise, accurate and professional
4. You may summarise and condense the information in the document",
        render_context(std::slice::from_ref(document))
    )
}

/// System prompt for synthesis across several chosen documents
pub fn multi_document_prompt(documents: &[Document]) -> String {
    format!(
        "You are the AI assistant of the enterprise knowledge base. Your task is to answer the \
         question based on the reference documents the user selected.

Reference documents:

{}
Answer rules:
1. Analyse the content of all relevant documents together
2. If several documents contain relevant information, combine them
3. State the source when citing information (for example \"According to 'document name'...\")
4. If the documents contradict each other, point it out
5. If none of the documents contain relevant information, say so honestly
6. Keep answers concise, accurate and well organised
7. Use markdown to make the answer clearer",
        render_context(documents)
    )
}

pub fn general_assistant_prompt() -> &'static str {
    GENERAL_ASSISTANT_PROMPT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_prompt_without_context() {
        let prompt = retrieval_prompt("");
        assert!(prompt.contains("cite the source"));
        assert!(!prompt.contains("Relevant documents retrieved"));
    }

    #[test]
    fn test_retrieval_prompt_embeds_block() {
        let prompt = retrieval_prompt("[Document 1] Handbook\nContent: text\n");
        assert!(prompt.ends_with("[Document 1] Handbook\nContent: text\n"));
    }

    #[test]
    fn test_single_document_prompt_truncates_deeply() {
        let doc = Document::new(4, "Handbook")
            .with_content("b".repeat(8100))
            .with_keywords("hr");
        let prompt = single_document_prompt(&doc);
        assert!(prompt.contains("[Document 1] Handbook"));
        assert!(prompt.contains("Keywords: hr"));
        assert!(prompt.contains(&"b".repeat(8000)));
        assert!(!prompt.contains(&"b".repeat(8001)));
    }

    #[test]
    fn test_multi_document_prompt_lists_all() {
        let docs = vec![Document::new(1, "A"), Document::new(2, "B")];
        let prompt = multi_document_prompt(&docs);
        assert!(prompt.contains("[Document 1] A"));
        assert!(prompt.contains("[Document 2] B"));
        assert!(prompt.contains("contradict"));
    }
}
