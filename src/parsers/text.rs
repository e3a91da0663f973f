use crate::results::ExtractionResult;

/// Parses a plain text document into an extraction result
///
/// Plain text has no markup, so only the paragraphs section is filled:
/// - Lines are trimmed
/// - Blank lines mark paragraph boundaries
/// - Lines within a paragraph are joined with single spaces
/// - Whitespace inside a paragraph is collapsed
pub fn parse(text: &str, url: &str) -> ExtractionResult {
    let paragraphs = split_into_paragraphs(text)
        .iter()
        .map(|para| process_paragraph(para))
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>();

    ::log::debug!("Text parser found {} paragraphs", paragraphs.len());

    ExtractionResult::new(
        url.to_string(),
        String::new(),
        None,
        Vec::new(),
        paragraphs,
        Vec::new(),
        Vec::new(),
    )
}

/// Splits text into paragraphs based on empty lines
pub fn split_into_paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current_paragraph: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Found an empty line, which marks a paragraph boundary
            if !current_paragraph.is_empty() {
                paragraphs.push(current_paragraph);
                current_paragraph = Vec::new();
            }
        } else {
            current_paragraph.push(trimmed);
        }
    }

    if !current_paragraph.is_empty() {
        paragraphs.push(current_paragraph);
    }

    paragraphs
}

/// Joins the lines of one paragraph and collapses whitespace
pub fn process_paragraph(paragraph: &[&str]) -> String {
    paragraph
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
