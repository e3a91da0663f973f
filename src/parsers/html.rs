use crate::results::{ExtractionResult, Heading, HeadingLevel, Image, Link, Meta};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta[name]"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4, h5, h6"));
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static IMAGES: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Parses an HTML document into an extraction result
///
/// Relative link and image URLs are resolved against `url`. Sections keep
/// document order and skip entries whose text is empty.
pub fn parse(html: &str, url: &str) -> ExtractionResult {
    let doc = Html::parse_document(html);
    let base = Url::parse(url).ok();

    let title = doc
        .select(&TITLE)
        .next()
        .map(|e| collapse_text(&e))
        .unwrap_or_default();

    let meta = extract_meta(&doc);

    let headings = doc
        .select(&HEADINGS)
        .filter_map(|e| {
            let level = HeadingLevel::from_tag(e.value().name())?;
            let text = collapse_text(&e);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect::<Vec<_>>();

    let paragraphs = doc
        .select(&PARAGRAPHS)
        .map(|e| collapse_text(&e))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>();

    let links = doc
        .select(&LINKS)
        .filter_map(|e| {
            let href = e.value().attr("href")?;
            let text = collapse_text(&e);
            Some(Link {
                url: resolve(base.as_ref(), href),
                text: (!text.is_empty()).then_some(text),
            })
        })
        .collect::<Vec<_>>();

    let images = doc
        .select(&IMAGES)
        .filter_map(|e| {
            let src = e.value().attr("src")?;
            let alt = e
                .value()
                .attr("alt")
                .map(str::trim)
                .filter(|alt| !alt.is_empty())
                .map(str::to_string);
            Some(Image {
                src: resolve(base.as_ref(), src),
                alt,
            })
        })
        .collect::<Vec<_>>();

    ::log::debug!(
        "HTML parser found {} headings, {} paragraphs, {} links, {} images",
        headings.len(),
        paragraphs.len(),
        links.len(),
        images.len()
    );

    ExtractionResult::new(
        url.to_string(),
        title,
        Some(meta),
        headings,
        paragraphs,
        links,
        images,
    )
}

fn extract_meta(doc: &Html) -> Meta {
    let mut meta = Meta::default();
    for element in doc.select(&META) {
        let (Some(name), Some(content)) =
            (element.value().attr("name"), element.value().attr("content"))
        else {
            continue;
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }
        let slot = match name.to_ascii_lowercase().as_str() {
            "description" => &mut meta.description,
            "keywords" => &mut meta.keywords,
            "author" => &mut meta.author,
            _ => continue,
        };
        // First occurrence wins
        if slot.is_none() {
            *slot = Some(content.to_string());
        }
    }
    meta
}

/// Joins the text nodes of an element and collapses whitespace
fn collapse_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves `href` against the page URL, keeping it verbatim when that fails
fn resolve(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    match base.map(|b| b.join(href)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
        <head>
            <title>  Example   Domain </title>
            <meta name="description" content="An example page">
            <meta name="Author" content="IANA">
            <meta name="viewport" content="width=device-width">
        </head>
        <body>
            <h1>Example Domain</h1>
            <h3>  </h3>
            <p>This domain is for   use in
               illustrative examples.</p>
            <p></p>
            <h2>More</h2>
            <a href="/about">About <b>us</b></a>
            <a href="https://other.org/x"></a>
            <img src="logo.png" alt="Logo">
            <img src="/spacer.gif" alt="">
        </body>
    </html>"#;

    #[test]
    fn test_parse_sections() {
        let result = parse(PAGE, "https://example.com/docs/index.html");

        assert_eq!(result.title, "Example Domain");
        assert_eq!(
            result.headings,
            vec![
                Heading {
                    level: HeadingLevel::H1,
                    text: "Example Domain".to_string()
                },
                Heading {
                    level: HeadingLevel::H2,
                    text: "More".to_string()
                },
            ]
        );
        assert_eq!(
            result.paragraphs,
            vec!["This domain is for use in illustrative examples.".to_string()]
        );
        assert_eq!(result.links[0].url, "https://example.com/about");
        assert_eq!(result.links[0].text.as_deref(), Some("About us"));
        assert_eq!(result.links[1].url, "https://other.org/x");
        assert_eq!(result.links[1].text, None);
        assert_eq!(result.images[0].src, "https://example.com/docs/logo.png");
        assert_eq!(result.images[0].alt.as_deref(), Some("Logo"));
        assert_eq!(result.images[1].alt, None);
        assert_eq!(result.stats.word_count, 7);
    }

    #[test]
    fn test_parse_meta() {
        let result = parse(PAGE, "https://example.com/");
        let meta = result.meta.unwrap();
        assert_eq!(meta.description.as_deref(), Some("An example page"));
        assert_eq!(meta.author.as_deref(), Some("IANA"));
        assert_eq!(meta.keywords, None);
    }

    #[test]
    fn test_parse_without_title_or_meta() {
        let result = parse("<p>Hello</p>", "https://example.com/");
        assert_eq!(result.title, "");
        assert!(result.meta.is_none());
        assert_eq!(result.paragraphs, vec!["Hello".to_string()]);
    }

    #[test]
    fn test_unresolvable_base_keeps_href() {
        let result = parse("<a href='/rel'>x</a>", "not a url");
        assert_eq!(result.links[0].url, "/rel");
    }
}
