//! Advisory request/response types shared by the engine and its transports

use crate::errors::AdvisorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A question plus the optional structured fields a transport collected.
///
/// All fields are kept as the strings the user typed. The composer inserts
/// them verbatim; `validate` is the only place that interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub question: String,

    #[serde(default)]
    pub region: String,

    /// Temperature in °C, or empty
    #[serde(default)]
    pub temperature: String,

    /// One of the `Climate` names, or empty
    #[serde(default)]
    pub climate: String,
}

impl AdvisoryRequest {
    /// Create a request with only a question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_temperature(mut self, temperature: impl Into<String>) -> Self {
        self.temperature = temperature.into();
        self
    }

    pub fn with_climate(mut self, climate: impl Into<String>) -> Self {
        self.climate = climate.into();
        self
    }

    /// Validate the structured fields.
    ///
    /// - the question must contain at least one non-whitespace character
    /// - the temperature must be empty or a finite number
    /// - the climate must be empty or one of the known climate types
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if self.question.trim().is_empty() {
            return Err(AdvisorError::EmptyQuestion);
        }

        let temperature = self.temperature.trim();
        if !temperature.is_empty() {
            match temperature.parse::<f64>() {
                Ok(value) if value.is_finite() => {}
                _ => {
                    return Err(AdvisorError::InvalidInput(format!(
                        "temperature '{}' is not a number",
                        self.temperature
                    )))
                }
            }
        }

        if !self.climate.is_empty() {
            self.climate.parse::<Climate>()?;
        }

        Ok(())
    }
}

/// Climate types offered by the web form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Climate {
    Tropical,
    Dry,
    Temperate,
    Continental,
    Polar,
}

impl Climate {
    /// All climate types in display order
    pub const ALL: [Climate; 5] = [
        Climate::Tropical,
        Climate::Dry,
        Climate::Temperate,
        Climate::Continental,
        Climate::Polar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Climate::Tropical => "Tropical",
            Climate::Dry => "Dry",
            Climate::Temperate => "Temperate",
            Climate::Continental => "Continental",
            Climate::Polar => "Polar",
        }
    }
}

impl fmt::Display for Climate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Climate {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Climate::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AdvisorError::InvalidInput(format!("unknown climate type '{}'", s)))
    }
}

/// The advisor's reply to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    /// Generated answer text, verbatim from the completion service
    pub answer: String,

    /// Keys of the corpus documents injected as context, in order
    pub documents: Vec<String>,
}

impl Advice {
    pub fn new(answer: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            documents,
        }
    }
}
