//! Markup rendering
//!
//! Text that did not originate in this crate (completion output, echoed
//! form values, error hints) is turned into `SafeMarkup` before it is placed
//! in a page. `SafeMarkup` has no public constructor, so the only way to get
//! one is through a `MarkupRenderer`.

use std::fmt;

/// Markup that is safe to embed in an HTML page.
///
/// Outside this crate a value can only come from a renderer:
///
/// ```compile_fail
/// let markup: web_form::SafeMarkup = Default::default();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    /// Blank markup for empty form fields
    pub(crate) fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns untrusted text into markup
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, text: &str) -> SafeMarkup;
}

/// Escapes the HTML metacharacters `& < > " '`.
///
/// The output is safe both as element content and inside a quoted attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl MarkupRenderer for HtmlEscaper {
    fn render(&self, text: &str) -> SafeMarkup {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                c => out.push(c),
            }
        }
        SafeMarkup(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_markup() {
        let html = HtmlEscaper.render(r#"<script>alert("x")</script> & 'y'"#);
        assert_eq!(
            html.as_str(),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#x27;y&#x27;"
        );
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "Use neem oil.\nKeep soil pH 6.0–7.0 at 25 °C.";
        assert_eq!(HtmlEscaper.render(text).as_str(), text);
    }

    #[test]
    fn test_ampersand_escaped_once() {
        assert_eq!(HtmlEscaper.render("&amp;").as_str(), "&amp;amp;");
    }
}
