//! The advisor page
//!
//! A single HTML page: the question form, followed by either the answer or
//! an error hint. Every dynamic value on it is `SafeMarkup`.

use crate::render::{MarkupRenderer, SafeMarkup};
use sdk::types::Climate;
use serde::Deserialize;

/// Fields posted by the form. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub question: String,
    pub region: String,
    pub temperature: String,
    pub climate: String,
}

impl From<FormInput> for sdk::types::AdvisoryRequest {
    fn from(form: FormInput) -> Self {
        sdk::types::AdvisoryRequest::new(form.question)
            .with_region(form.region)
            .with_temperature(form.temperature)
            .with_climate(form.climate)
    }
}

/// Everything shown on one rendering of the page
#[derive(Debug, Clone)]
pub struct PageView {
    question: SafeMarkup,
    region: SafeMarkup,
    temperature: SafeMarkup,
    climate: Option<Climate>,
    answer: Option<SafeMarkup>,
    error: Option<SafeMarkup>,
}

impl PageView {
    /// The empty form
    pub fn blank() -> Self {
        Self {
            question: SafeMarkup::empty(),
            region: SafeMarkup::empty(),
            temperature: SafeMarkup::empty(),
            climate: None,
            answer: None,
            error: None,
        }
    }

    /// The form refilled with what the user submitted
    pub fn with_input(renderer: &dyn MarkupRenderer, form: &FormInput) -> Self {
        Self {
            question: renderer.render(&form.question),
            region: renderer.render(&form.region),
            temperature: renderer.render(&form.temperature),
            climate: form.climate.parse().ok(),
            answer: None,
            error: None,
        }
    }

    pub fn answer(mut self, renderer: &dyn MarkupRenderer, text: &str) -> Self {
        self.answer = Some(renderer.render(text));
        self
    }

    pub fn error(mut self, renderer: &dyn MarkupRenderer, hint: &str) -> Self {
        self.error = Some(renderer.render(hint));
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(4096);
        html.push_str(HEAD);

        html.push_str("<div class=\"container\">\n");
        html.push_str("    <h2>🌱 Crop Disease &amp; Soil Advisor</h2>\n\n");
        html.push_str("    <form method=\"post\">\n");
        push_input(
            &mut html,
            "text",
            "question",
            "Ask about crop disease or soil...",
            &self.question,
            true,
        );
        push_input(
            &mut html,
            "text",
            "region",
            "Region (e.g., North India, Punjab)",
            &self.region,
            false,
        );
        push_input(
            &mut html,
            "number",
            "temperature",
            "Temperature (°C)",
            &self.temperature,
            false,
        );
        self.push_climate_select(&mut html);
        html.push_str("        <button type=\"submit\">Get Recommendation</button>\n");
        html.push_str("    </form>\n");

        if let Some(error) = &self.error {
            html.push_str("\n    <div class=\"error\">\n        <p>");
            html.push_str(error.as_str());
            html.push_str("</p>\n    </div>\n");
        }

        if let Some(answer) = self.answer.as_ref().filter(|a| !a.is_empty()) {
            html.push_str("\n    <div class=\"answer\">\n        <h3>Answer:</h3>\n        <p>");
            html.push_str(answer.as_str());
            html.push_str("</p>\n    </div>\n");
        }

        html.push_str("</div>\n\n</body>\n</html>\n");
        html
    }

    fn push_climate_select(&self, html: &mut String) {
        html.push_str("        <select name=\"climate\">\n");
        html.push_str("            <option value=\"\">Select Climate Type</option>\n");
        for climate in Climate::ALL {
            let selected = if self.climate == Some(climate) {
                " selected"
            } else {
                ""
            };
            html.push_str(&format!(
                "            <option value=\"{0}\"{1}>{0}</option>\n",
                climate.as_str(),
                selected
            ));
        }
        html.push_str("        </select>\n\n");
    }
}

fn push_input(
    html: &mut String,
    kind: &str,
    name: &str,
    placeholder: &str,
    value: &SafeMarkup,
    required: bool,
) {
    html.push_str(&format!(
        "        <input type=\"{}\" name=\"{}\" placeholder=\"{}\"",
        kind, name, placeholder
    ));
    if kind == "number" {
        html.push_str(" step=\"any\"");
    }
    if !value.is_empty() {
        html.push_str(&format!(" value=\"{}\"", value));
    }
    if required {
        html.push_str(" required");
    }
    html.push_str(">\n\n");
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI for Sustainable Agriculture</title>
    <style>
        body {
            margin: 0;
            padding: 0;
            min-height: 100vh;
            display: flex;
            justify-content: center;
            align-items: center;
            background-color: #e8f5e9;
            font-family: Arial, sans-serif;
        }

        .container {
            background: white;
            padding: 30px 40px;
            border-radius: 12px;
            width: 500px;
            box-shadow: 0 4px 12px rgba(0,0,0,0.1);
            text-align: center;
        }

        h2 {
            color: #2e7d32;
            margin-bottom: 20px;
        }

        input, select, button {
            width: 100%;
            padding: 10px;
            margin-top: 10px;
            font-size: 15px;
            border-radius: 6px;
            border: 1px solid #ccc;
            box-sizing: border-box;
        }

        button {
            background-color: #43a047;
            color: white;
            border: none;
            cursor: pointer;
            margin-top: 15px;
        }

        button:hover {
            background-color: #388e3c;
        }

        .answer {
            margin-top: 20px;
            text-align: left;
            font-size: 15px;
            white-space: pre-wrap;
        }

        .error {
            margin-top: 20px;
            padding: 10px 15px;
            text-align: left;
            background: #fff3cd;
            border-left: 4px solid #ffc107;
            color: #856404;
        }
    </style>
</head>
<body>

"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlEscaper;

    #[test]
    fn test_blank_page_has_form_and_no_answer() {
        let html = PageView::blank().render();
        assert!(html.contains("<form method=\"post\">"));
        assert!(html.contains("name=\"question\""));
        assert!(!html.contains("class=\"answer\""));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_climate_options_in_order() {
        let html = PageView::blank().render();
        let positions: Vec<usize> = ["Tropical", "Dry", "Temperate", "Continental", "Polar"]
            .iter()
            .map(|c| html.find(&format!("<option value=\"{}\"", c)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(html.contains("<option value=\"\">Select Climate Type</option>"));
    }

    #[test]
    fn test_answer_is_escaped() {
        let html = PageView::blank()
            .answer(&HtmlEscaper, "<img src=x onerror=alert(1)>")
            .render();
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_input_is_refilled_and_escaped() {
        let form = FormInput {
            question: "\"quoted\" blight".to_string(),
            region: "Punjab".to_string(),
            temperature: "31".to_string(),
            climate: "dry".to_string(),
        };
        let html = PageView::with_input(&HtmlEscaper, &form).render();
        assert!(html.contains("value=\"&quot;quoted&quot; blight\""));
        assert!(html.contains("value=\"Punjab\""));
        assert!(html.contains("<option value=\"Dry\" selected>Dry</option>"));
    }

    #[test]
    fn test_blank_page_has_no_values() {
        let view = PageView::blank();
        assert!(view.question.is_empty());
        assert!(view.answer.is_none());

        let html = view.render();
        assert!(html.contains("placeholder=\"Ask about crop disease or soil...\" required>"));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_error_hint_is_shown() {
        let html = PageView::blank()
            .error(&HtmlEscaper, "The crop advisor is currently unavailable")
            .render();
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("currently unavailable"));
    }

    #[test]
    fn test_form_converts_to_request() {
        let form = FormInput {
            question: "soil".to_string(),
            climate: "Polar".to_string(),
            ..Default::default()
        };
        let request: sdk::types::AdvisoryRequest = form.into();
        assert_eq!(request.question, "soil");
        assert_eq!(request.climate, "Polar");
        assert_eq!(request.region, "");
    }
}
