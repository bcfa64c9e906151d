use super::ChatMessage;
use crate::models::{single_line, Candidate};
use crate::pipeline::SearchMode;
use std::fmt::Write;

/// Builds the ranking prompt for one batch of candidates.
///
/// Output depends only on the inputs, so identical batches always produce
/// identical requests.
#[derive(Debug, Clone)]
pub struct PromptEncoder {
    system_prompt: String,
    preview_chars: usize,
}

impl PromptEncoder {
    pub fn new(system_prompt: impl Into<String>, preview_chars: usize) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            preview_chars,
        }
    }

    /// Render the user prompt listing every candidate
    pub fn encode(&self, query: &str, candidates: &[Candidate], mode: SearchMode) -> String {
        let mut listing = String::new();
        for candidate in candidates {
            let doc = &candidate.document;
            let preview = single_line(doc.preview(), self.preview_chars);
            // Writing to a String cannot fail.
            let _ = write!(
                listing,
                "ID: {}\nName: {}\nPreview: {}\n\n",
                doc.id(),
                single_line(doc.name(), usize::MAX),
                preview
            );
        }

        format!(
            "QUERY: {}\n\nCONTEXT: {}\n\nCANDIDATES:\n{}\n\
             Please select the files that are most relevant to the query. \
             Return the output as valid JSON in the form \
             {{\"ranked\": [\"<ID>\", ...], \"reasoning\": \"<short explanation>\"}} \
             using only IDs from the list above.",
            query,
            mode_note(mode, candidates.len()),
            listing
        )
    }

    /// The full conversation for one batch: system prompt, then the listing
    pub fn messages(
        &self,
        query: &str,
        candidates: &[Candidate],
        mode: SearchMode,
    ) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(self.encode(query, candidates, mode)),
        ]
    }
}

fn mode_note(mode: SearchMode, count: usize) -> String {
    match mode {
        SearchMode::Full => format!(
            "You are seeing all indexed files ({} in this batch). Judge each one on its own merits.",
            count
        ),
        SearchMode::Hybrid => format!(
            "You are seeing a pre-filtered subset of {} files selected by keyword relevance. \
             Some may still be irrelevant.",
            count
        ),
    }
}
