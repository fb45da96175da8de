//! Prompt templating
//!
//! Two pure functions: the labeled query block built from the user's fields,
//! and the final prompt wrapping that block with the retrieved context.
//! Neither touches the network, so both are tested directly.

use crate::config::RetrievalSource;
use sdk::types::AdvisoryRequest;

/// Opening line of every prompt
pub const SYSTEM_FRAMING: &str = "You are an AI assistant for sustainable agriculture.";

/// Closing instruction of every prompt
pub const ANSWER_INSTRUCTION: &str =
    "Answer clearly with crop disease info and soil requirements.";

/// The user's question and structured fields, borrowed from a request.
///
/// Values are inserted verbatim; blank fields stay blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFields<'a> {
    pub question: &'a str,
    pub region: &'a str,
    pub temperature: &'a str,
    pub climate: &'a str,
}

impl<'a> QueryFields<'a> {
    pub fn new(question: &'a str, region: &'a str, temperature: &'a str, climate: &'a str) -> Self {
        Self {
            question,
            region,
            temperature,
            climate,
        }
    }

    pub fn from_request(request: &'a AdvisoryRequest) -> Self {
        Self::new(
            &request.question,
            &request.region,
            &request.temperature,
            &request.climate,
        )
    }

    /// The four labeled lines, always all present and in this order
    pub fn query_block(&self) -> String {
        format!(
            "User Question: {}\nRegion: {}\nTemperature: {} °C\nClimate Type: {}",
            self.question, self.region, self.temperature, self.climate
        )
    }

    /// Text matched against the corpus for `source`
    pub fn retrieval_text(&self, source: RetrievalSource) -> String {
        match source {
            RetrievalSource::Combined => self.query_block(),
            RetrievalSource::Question => self.question.to_string(),
        }
    }
}

/// Everything the prompt template needs
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    /// Joined context documents; may be empty
    pub context: &'a str,
    pub fields: QueryFields<'a>,
}

/// Render the final prompt sent as the single user message
pub fn render_prompt(input: &PromptInput<'_>) -> String {
    format!(
        "{framing}\n\nContext:\n{context}\n\nQuestion:\n{query}\n\n{instruction}",
        framing = SYSTEM_FRAMING,
        context = input.context,
        query = input.fields.query_block(),
        instruction = ANSWER_INSTRUCTION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_block_has_all_lines_in_order() {
        let fields = QueryFields::new("Why are leaves yellow?", "Punjab", "31", "Dry");
        assert_eq!(
            fields.query_block(),
            "User Question: Why are leaves yellow?\n\
             Region: Punjab\n\
             Temperature: 31 °C\n\
             Climate Type: Dry"
        );
    }

    #[test]
    fn test_blank_fields_are_kept() {
        let fields = QueryFields::new("soil for rice", "", "", "");
        let block = fields.query_block();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(
            lines,
            vec![
                "User Question: soil for rice",
                "Region: ",
                "Temperature:  °C",
                "Climate Type: "
            ]
        );
    }

    #[test]
    fn test_retrieval_text_per_source() {
        let fields = QueryFields::new("wheat rust", "Punjab", "", "");
        assert_eq!(fields.retrieval_text(RetrievalSource::Question), "wheat rust");
        assert_eq!(fields.retrieval_text(RetrievalSource::Combined), fields.query_block());
    }

    #[test]
    fn test_fields_are_not_escaped() {
        let fields = QueryFields::new("<b>rust</b> & mildew", "North\nIndia", "", "");
        let block = fields.query_block();
        assert!(block.contains("<b>rust</b> & mildew"));
        assert!(block.contains("Region: North\nIndia"));
    }

    #[test]
    fn test_prompt_layout() {
        let request = AdvisoryRequest::new("blight?").with_climate("Tropical");
        let input = PromptInput {
            context: "Tomato blight causes yellowing leaves.",
            fields: QueryFields::from_request(&request),
        };
        let prompt = render_prompt(&input);

        assert!(prompt.starts_with(SYSTEM_FRAMING));
        assert!(prompt.ends_with(ANSWER_INSTRUCTION));
        assert!(prompt.contains("Context:\nTomato blight causes yellowing leaves.\n\n"));
        assert!(prompt.contains("Question:\nUser Question: blight?\n"));
        assert!(prompt.contains("Climate Type: Tropical\n\n"));
    }

    #[test]
    fn test_prompt_with_empty_context() {
        let input = PromptInput {
            context: "",
            fields: QueryFields::new("q", "", "", ""),
        };
        assert!(render_prompt(&input).contains("Context:\n\n\nQuestion:"));
    }
}
