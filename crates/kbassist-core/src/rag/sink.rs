//! Event sink receiving streamed answers

use crate::knowledge::DocumentRef;

/// Host-side receiver for a streamed answer
///
/// `on_documents` fires exactly once per streamed request, before the first
/// answer chunk of search-backed flows.
pub trait AnswerSink: Send {
    fn on_chunk(&mut self, text: &str);

    fn on_documents(&mut self, documents: &[DocumentRef]);
}

/// Sink assembled from two closures
pub struct FnSink<C, D> {
    on_chunk: C,
    on_documents: D,
}

impl<C, D> FnSink<C, D>
where
    C: FnMut(&str) + Send,
    D: FnMut(&[DocumentRef]) + Send,
{
    pub fn new(on_chunk: C, on_documents: D) -> Self {
        Self {
            on_chunk,
            on_documents,
        }
    }
}

impl<C, D> AnswerSink for FnSink<C, D>
where
    C: FnMut(&str) + Send,
    D: FnMut(&[DocumentRef]) + Send,
{
    fn on_chunk(&mut self, text: &str) {
        (self.on_chunk)(text)
    }

    fn on_documents(&mut self, documents: &[DocumentRef]) {
        (self.on_documents)(documents)
    }
}
