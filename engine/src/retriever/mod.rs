//! Context retrieval
//!
//! Selects the corpus documents that share at least one word with a query.
//! Matching is a case-insensitive substring test: a document matches when any
//! whitespace-separated word of the query occurs anywhere in its text.
//!
//! There is no ranking. Documents are visited in corpus enumeration order and
//! collection stops after `MAX_CONTEXT_DOCUMENTS` matches.
//!
//! The `Retriever` trait is the seam for other corpus layouts; the advisor
//! only ever talks to the trait.

use sdk::errors::AdvisorError;

pub mod directory;

pub use directory::DirectoryRetriever;

/// Upper bound on documents injected into a prompt
pub const MAX_CONTEXT_DOCUMENTS: usize = 2;

/// Separator placed between document texts in the joined context
pub const CONTEXT_SEPARATOR: &str = "\n";

/// A corpus document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name (or other stable identifier) of the document
    pub key: String,

    /// Raw text content
    pub text: String,
}

impl Document {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Documents selected for one query, in corpus order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    documents: Vec<Document>,
}

impl Context {
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Keys of the selected documents, in order
    pub fn keys(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.key.clone()).collect()
    }

    /// Document texts joined with `CONTEXT_SEPARATOR`; empty if nothing matched
    pub fn joined(&self) -> String {
        self.documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }
}

/// Split a query into lowercase words
pub fn query_words(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// True if any of `words` occurs in `text`, ignoring case.
///
/// `words` must already be lowercase (see `query_words`).
pub fn document_matches(text: &str, words: &[String]) -> bool {
    if words.is_empty() {
        return false;
    }
    let folded = text.to_lowercase();
    words.iter().any(|word| folded.contains(word.as_str()))
}

/// Select up to `MAX_CONTEXT_DOCUMENTS` matching documents from `documents`.
///
/// The iterator is consumed lazily: documents after the last needed match are
/// never read, and a query without words reads nothing at all. The first read
/// error encountered is returned.
pub fn select_context<I>(documents: I, query: &str) -> Result<Context, AdvisorError>
where
    I: IntoIterator<Item = Result<Document, AdvisorError>>,
{
    let words = query_words(query);
    let mut context = Context::default();

    if words.is_empty() {
        return Ok(context);
    }

    for document in documents {
        let document = document?;
        if document_matches(&document.text, &words) {
            context.documents.push(document);
            if context.documents.len() == MAX_CONTEXT_DOCUMENTS {
                break;
            }
        }
    }

    Ok(context)
}

/// Retriever trait that all corpus backends implement
pub trait Retriever: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Select the context documents for `query`
    fn select(&self, query: &str) -> Result<Context, AdvisorError>;

    /// Joined context text for `query`
    fn retrieve(&self, query: &str) -> Result<String, AdvisorError> {
        Ok(self.select(query)?.joined())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[(&str, &str)]) -> Vec<Result<Document, AdvisorError>> {
        texts
            .iter()
            .map(|(key, text)| Ok(Document::new(*key, *text)))
            .collect()
    }

    #[test]
    fn test_query_words_lowercases_and_splits() {
        assert_eq!(
            query_words("  What causes\tBlight\n"),
            vec!["what", "causes", "blight"]
        );
        assert!(query_words("").is_empty());
        assert!(query_words(" \n\t ").is_empty());
    }

    #[test]
    fn test_document_matches_substring() {
        let words = query_words("blight");
        assert!(document_matches("Tomato BLIGHTED leaves", &words));
        assert!(!document_matches("Wheat rust info.", &words));
    }

    #[test]
    fn test_tomato_blight_scenario() {
        let docs = corpus(&[("doc1.txt", "Tomato blight causes yellowing leaves.")]);
        let context = select_context(docs, "What causes blight in tomato plants?").unwrap();
        assert_eq!(context.joined(), "Tomato blight causes yellowing leaves.");
        assert_eq!(context.keys(), vec!["doc1.txt"]);
    }

    #[test]
    fn test_no_overlap_scenario() {
        let docs = corpus(&[("doc1.txt", "Wheat rust info.")]);
        let context = select_context(docs, "soil pH for rice").unwrap();
        assert!(context.is_empty());
        assert_eq!(context.joined(), "");
    }

    #[test]
    fn test_at_most_two_documents_in_order() {
        let docs = corpus(&[
            ("a.txt", "blight one"),
            ("b.txt", "nothing here"),
            ("c.txt", "blight two"),
            ("d.txt", "blight three"),
        ]);
        let context = select_context(docs, "blight").unwrap();
        assert_eq!(context.keys(), vec!["a.txt", "c.txt"]);
        assert_eq!(context.joined(), "blight one\nblight two");
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let docs = corpus(&[("a.txt", "anything at all")]);
        assert!(select_context(docs, "").unwrap().is_empty());
    }

    #[test]
    fn test_stops_reading_after_limit() {
        let docs = vec![
            Ok(Document::new("a.txt", "rice")),
            Ok(Document::new("b.txt", "rice")),
            Err(AdvisorError::CorpusRead("c.txt: unreadable".into())),
        ];
        let context = select_context(docs, "rice").unwrap();
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_read_error_propagates() {
        let docs = vec![
            Ok(Document::new("a.txt", "wheat")),
            Err(AdvisorError::CorpusRead("b.txt: unreadable".into())),
        ];
        let err = select_context(docs, "rice").unwrap_err();
        assert!(matches!(err, AdvisorError::CorpusRead(_)));
    }
}
