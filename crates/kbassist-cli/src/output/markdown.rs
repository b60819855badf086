//! Markdown output formatter

use kbassist_core::{Document, DocumentRef, EnhancedQuery, Intent};

pub fn format_answer(answer: &str, documents: &[DocumentRef]) -> String {
    let mut output = String::from("# Answer\n\n");
    output.push_str(answer.trim_end());
    output.push_str("\n\n");
    if !documents.is_empty() {
        output.push_str(&format_sources(documents));
    }
    output
}

pub fn format_sources(documents: &[DocumentRef]) -> String {
    let mut output = String::from("## Sources\n\n");
    for doc in documents {
        output.push_str(&format!("- **{}** (`#{}`)", doc.title, doc.id));
        if let Some(ref keywords) = doc.keywords {
            output.push_str(&format!(" - {}", keywords));
        }
        output.push('\n');
    }
    if documents.is_empty() {
        output.push_str("*No documents used*\n");
    }
    output
}

pub fn format_documents(documents: &[Document]) -> String {
    let mut output = String::from("# Search Results\n\n");

    for (i, doc) in documents.iter().enumerate() {
        output.push_str(&format!("## {}. {}\n\n", i + 1, doc.title));
        output.push_str(&format!("- **ID**: `{}`\n", doc.id));
        if let Some(ref summary) = doc.summary {
            output.push_str(&format!("- **Summary**: {}\n", summary));
        }
        if let Some(ref keywords) = doc.keywords {
            output.push_str(&format!("- **Keywords**: {}\n", keywords));
        }
        output.push_str("\n---\n\n");
    }

    if documents.is_empty() {
        output.push_str("*No results found*\n");
    }

    output
}

pub fn format_intent(intent: &Intent) -> String {
    format!(
        "# Intent\n\n- **Intent**: {}\n- **Needs search**: {}\n- **Keywords**: {}\n",
        intent.label,
        intent.need_search,
        intent.keywords.join(", ")
    )
}

pub fn format_list(heading: &str, items: &[String]) -> String {
    let mut output = format!("# {}\n\n", heading);
    for item in items {
        output.push_str(&format!("- {}\n", item));
    }
    output
}

pub fn format_enhanced(query: &EnhancedQuery) -> String {
    let mut output = format!("# Enhanced Query\n\n**Intent**: {}\n\n", query.intent);
    output.push_str("## Keywords\n\n");
    for keyword in &query.keywords {
        output.push_str(&format!("- {}\n", keyword));
    }
    output.push_str("\n## Suggestions\n\n");
    for suggestion in &query.suggestions {
        output.push_str(&format!("- {}\n", suggestion));
    }
    output
}
