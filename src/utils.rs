use std::time::Duration;

/// URL characters per extra block of scrape time
const URL_CHARS_PER_BLOCK: usize = 20;

const EXTRA_MS_PER_BLOCK: u64 = 100;

/// Longest file stem written for a persisted result, in characters
const MAX_STEM_CHARS: usize = 100;

/// Time limit for one scrape of `url`
///
/// Long URLs get a little more time on top of the configured base.
pub fn scrape_timeout(base_ms: u64, url: &str) -> Duration {
    let blocks = (url.chars().count() / URL_CHARS_PER_BLOCK) as u64;
    Duration::from_millis(base_ms.saturating_add(blocks * EXTRA_MS_PER_BLOCK))
}

/// File name a scraped result for `url` is saved under
pub fn result_file_name(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let stem: String = without_scheme
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();
    format!("{}.json", stem)
}
