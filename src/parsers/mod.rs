pub mod html;
pub mod text;


use crate::results::ExtractionResult;

/// Enum to represent different types of content parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserType {
    /// HTML parser
    Html,
    /// Plain text parser
    Text,
}

impl ParserType {
    /// Determines the parser type from a response `Content-Type` header value
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            ::log::debug!("No content type, classifying as HTML");
            return ParserType::Html;
        };

        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "text/plain" {
            ::log::debug!("Classifying as Text: {}", content_type);
            ParserType::Text
        } else {
            ::log::debug!("Classifying as HTML: {}", content_type);
            ParserType::Html
        }
    }
}

/// Main parser that delegates to specific format parsers
pub struct Parser;

impl Parser {
    /// Parse a fetched body into an extraction result for `url`
    pub fn parse(body: &str, url: &str, parser_type: ParserType) -> ExtractionResult {
        match parser_type {
            ParserType::Html => html::parse(body, url),
            ParserType::Text => text::parse(body, url),
        }
    }

    /// Determine parser type from the content type and then parse
    pub fn parse_with_content_type(
        body: &str,
        url: &str,
        content_type: Option<&str>,
    ) -> ExtractionResult {
        Self::parse(body, url, ParserType::from_content_type(content_type))
    }
}
