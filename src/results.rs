use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level of an extracted heading (`h1` through `h6`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Maps an element tag name to a heading level
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h1" => Some(Self::H1),
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            "h4" => Some(Self::H4),
            "h5" => Some(Self::H5),
            "h6" => Some(Self::H6),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page metadata taken from `<meta name=...>` tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Meta {
    /// True when no metadata field was found
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.keywords.is_none() && self.author.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Aggregate counts over the extracted sections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_headings: usize,
    pub total_paragraphs: usize,
    pub total_links: usize,
    pub total_images: usize,
    /// Sum of every countable item, shown by the "all" view
    pub word_count: usize,
}

/// Structured content extracted from one scraped page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Request URL, also used as the cache key
    pub url: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    pub headings: Vec<Heading>,

    pub paragraphs: Vec<String>,

    pub links: Vec<Link>,

    pub images: Vec<Image>,

    pub stats: Stats,

    /// Time the scrape completed
    pub scraped_at: DateTime<Utc>,
}

impl ExtractionResult {
    /// Create a result whose stats are derived from the given sections
    pub fn new(
        url: String,
        title: String,
        meta: Option<Meta>,
        headings: Vec<Heading>,
        paragraphs: Vec<String>,
        links: Vec<Link>,
        images: Vec<Image>,
    ) -> Self {
        let meta = meta.filter(|m| !m.is_empty());
        let mut result = Self {
            url,
            title,
            meta,
            headings,
            paragraphs,
            links,
            images,
            stats: Stats::default(),
            scraped_at: Utc::now(),
        };
        result.stats = result.compute_stats();
        result
    }

    /// Recomputes the counts from the section lengths
    pub fn compute_stats(&self) -> Stats {
        let total_headings = self.headings.len();
        let total_paragraphs = self.paragraphs.len();
        let total_links = self.links.len();
        let total_images = self.images.len();
        Stats {
            total_headings,
            total_paragraphs,
            total_links,
            total_images,
            word_count: total_headings + total_paragraphs + total_links + total_images,
        }
    }
}
