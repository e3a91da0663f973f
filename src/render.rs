use crate::handler::ScrapeEnvelope;
use crate::pagination::{ContentFilter, PaginationViewModel, Section, SectionItems};
use std::fmt;

/// Paragraphs longer than this many characters are cut in the listing
pub const PARAGRAPH_PREVIEW_CHARS: usize = 200;

/// Plain text rendering of a scrape response for the terminal
///
/// Sections are windowed through the view model. The `focus` section, if
/// any, shows its current page; all others show their first display.
pub struct ResultView<'a> {
    envelope: &'a ScrapeEnvelope,
    view: &'a PaginationViewModel,
    focus: Option<Section>,
}

impl<'a> ResultView<'a> {
    pub fn new(envelope: &'a ScrapeEnvelope, view: &'a PaginationViewModel) -> Self {
        Self {
            envelope,
            view,
            focus: None,
        }
    }

    /// Show `section` at its current page instead of its first display
    pub fn with_focus(mut self, section: Section) -> Self {
        self.focus = Some(section);
        self
    }

    fn write_stats(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.envelope.result.stats;
        let filter = self.view.filter();
        let cards = [
            ("headings", ContentFilter::Only(Section::Headings)),
            ("paragraphs", ContentFilter::Only(Section::Paragraphs)),
            ("links", ContentFilter::Only(Section::Links)),
            ("images", ContentFilter::Only(Section::Images)),
            ("all", ContentFilter::All),
        ];
        let line = cards
            .iter()
            .map(|(label, card)| {
                let marker = if *card == filter { "*" } else { "" };
                format!("{}{} {}", marker, label, card.stat_value(stats))
            })
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(f, "Stats: {}", line)
    }

    fn write_section(&self, f: &mut fmt::Formatter<'_>, section: Section) -> fmt::Result {
        let items = section.items(&self.envelope.result);
        if items.is_empty() {
            return Ok(());
        }

        writeln!(f, "{} ({})", title_case(section), items.len())?;

        let window = if self.focus == Some(section) {
            self.view.current_window(section)
        } else {
            self.view.initial_window(section)
        };

        match items.slice(window) {
            SectionItems::Headings(headings) => {
                for heading in headings {
                    writeln!(
                        f,
                        "  [{}] {}",
                        heading.level.as_str().to_uppercase(),
                        heading.text
                    )?;
                }
            }
            SectionItems::Paragraphs(paragraphs) => {
                for paragraph in paragraphs {
                    writeln!(f, "  • {}", preview(paragraph))?;
                }
            }
            SectionItems::Links(links) => {
                for link in links {
                    let text = link.text.as_deref().unwrap_or(&link.url);
                    writeln!(f, "  • {} <{}>", text, link.url)?;
                }
            }
            SectionItems::Images(images) => {
                for image in images {
                    match &image.alt {
                        Some(alt) => writeln!(f, "  • {} ({})", image.src, alt)?,
                        None => writeln!(f, "  • {}", image.src)?,
                    }
                }
            }
        }

        if let Some(controls) = self.view.controls(section) {
            writeln!(
                f,
                "  {} Page {} / {} {}",
                if controls.previous_enabled { "[< prev]" } else { "[ prev ]" },
                controls.current_page,
                controls.total_pages,
                if controls.next_enabled { "[next >]" } else { "[ next ]" },
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ResultView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = &self.envelope.result;

        write!(f, "=== Scrape results ===")?;
        if self.envelope.from_cache {
            write!(f, " [from cache]")?;
        }
        writeln!(f)?;

        self.write_stats(f)?;
        writeln!(f, "Title: {}", result.title)?;

        if let Some(meta) = &result.meta {
            writeln!(f, "Metadata:")?;
            if let Some(description) = &meta.description {
                writeln!(f, "  Description: {}", description)?;
            }
            if let Some(keywords) = &meta.keywords {
                writeln!(f, "  Keywords: {}", keywords)?;
            }
            if let Some(author) = &meta.author {
                writeln!(f, "  Author: {}", author)?;
            }
        }

        for section in self.view.visible_sections() {
            self.write_section(f, section)?;
        }

        writeln!(f, "URL: {}", result.url)?;
        writeln!(f, "Scraped at: {}", result.scraped_at.to_rfc3339())
    }
}

fn title_case(section: Section) -> &'static str {
    match section {
        Section::Headings => "Headings",
        Section::Paragraphs => "Paragraphs",
        Section::Links => "Links",
        Section::Images => "Images",
    }
}

/// Cuts a paragraph to [`PARAGRAPH_PREVIEW_CHARS`] characters
pub fn preview(paragraph: &str) -> String {
    match paragraph.char_indices().nth(PARAGRAPH_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &paragraph[..idx]),
        None => paragraph.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Direction;
    use crate::results::Meta;
    use crate::test_support::sample_result;

    fn envelope(n: usize, from_cache: bool) -> ScrapeEnvelope {
        ScrapeEnvelope {
            result: sample_result("https://a.com", n),
            from_cache,
        }
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(250);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PARAGRAPH_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_first_display_shows_inline_items() {
        let envelope = envelope(25, true);
        let view = PaginationViewModel::for_result(&envelope.result);
        let text = ResultView::new(&envelope, &view).to_string();

        assert!(text.starts_with("=== Scrape results === [from cache]"));
        assert!(text.contains("Stats: headings 25 | paragraphs 25 | links 25 | images 25 | *all 100"));
        assert!(text.contains("  • paragraph 8\n"));
        assert!(!text.contains("  • paragraph 9\n"));
        assert!(text.contains("[ prev ] Page 1 / 3 [next >]"));
        assert!(text.contains("URL: https://a.com"));
    }

    #[test]
    fn test_focus_shows_current_page() {
        let envelope = envelope(25, false);
        let mut view = PaginationViewModel::for_result(&envelope.result);
        view.advance(Section::Links, Direction::Next);
        view.advance(Section::Links, Direction::Next);

        let text = ResultView::new(&envelope, &view)
            .with_focus(Section::Links)
            .to_string();

        assert!(!text.contains("[from cache]"));
        assert!(text.contains("  • link 20 <https://a.com/link/20>"));
        assert!(text.contains("  • link 24 <https://a.com/link/24>"));
        assert!(!text.contains("  • link 19 "));
        assert!(text.contains("[< prev] Page 3 / 3 [ next ]"));
    }

    #[test]
    fn test_filter_hides_sections() {
        let envelope = envelope(3, false);
        let mut view = PaginationViewModel::for_result(&envelope.result);
        view.set_filter(ContentFilter::Only(Section::Images));

        let text = ResultView::new(&envelope, &view).to_string();
        assert!(text.contains("Images (3)"));
        assert!(!text.contains("Headings (3)"));
        assert!(text.contains("*images 3"));
    }

    #[test]
    fn test_small_sections_have_no_controls() {
        let mut envelope = envelope(10, false);
        envelope.result.meta = Some(Meta {
            author: Some("Jo".to_string()),
            ..Meta::default()
        });
        let view = PaginationViewModel::for_result(&envelope.result);
        let text = ResultView::new(&envelope, &view).to_string();

        assert!(!text.contains("Page 1"));
        assert!(text.contains("  Author: Jo"));
        assert!(!text.contains("heading 9\n"));
    }
}
