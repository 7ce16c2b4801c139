//! HTML extraction for saint pages
//!
//! Saint pages have no semantic markup for their sections. The text body is
//! a flat run of paragraphs, and the sections are told apart by position:
//!
//! ```text
//! P[0] .. P[N-5]   story
//! P[N-4]           (section heading, ignored)
//! P[N-3]           reflection
//! P[N-2]           (section heading, ignored)
//! P[N-1]           prayer
//! ```
//!
//! List pages (days with several saints) instead carry a `div.saints-list`
//! with one link per saint page.

use crate::record::SaintRecord;
use crate::ExtractionError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const NAME_SELECTOR: &str = "div.feature__name";
const FEATURE_SELECTOR: &str = "div.feature";
const PORTRAIT_SELECTOR: &str = ".feature__portrait";
const BODY_SELECTOR: &str = "div.wg-text";
const PARAGRAPH_SELECTOR: &str = "p";
const SAINTS_LIST_SELECTOR: &str = "div.saints-list";
const LINK_SELECTOR: &str = "a[href]";

/// Turns a saint page into a [`SaintRecord`]
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    origin: String,
}

impl RecordExtractor {
    /// Creates an extractor that resolves portrait paths against `origin`
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Extracts a saint record from a page body
    ///
    /// # Returns
    ///
    /// * `Ok(SaintRecord)` - The page had a name and a text body
    /// * `Err(ExtractionError::MissingName)` - No (or an empty) name element
    /// * `Err(ExtractionError::MissingBody)` - No text body element
    ///
    /// Pages with fewer than four paragraphs are not an error; the sections
    /// their paragraphs cannot fill are left empty.
    ///
    /// # Example
    ///
    /// ```
    /// use daily_saints::pipeline::RecordExtractor;
    ///
    /// let html = r#"<div class="feature__name">São Lucas</div>
    ///     <div class="wg-text"><p>Oração final</p></div>"#;
    /// let record = RecordExtractor::new("https://example.com").extract(html).unwrap();
    /// assert_eq!(record.name(), "São Lucas");
    /// assert_eq!(record.prayer(), "Oração final");
    /// assert_eq!(record.story(), "");
    /// ```
    pub fn extract(&self, html: &str) -> Result<SaintRecord, ExtractionError> {
        let document = Html::parse_document(html);

        let name = document
            .select(&selector(NAME_SELECTOR)?)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty())
            .ok_or(ExtractionError::MissingName)?;

        let body = document
            .select(&selector(BODY_SELECTOR)?)
            .next()
            .ok_or(ExtractionError::MissingBody)?;

        let paragraph_selector = selector(PARAGRAPH_SELECTOR)?;
        let paragraphs: Vec<String> = body.select(&paragraph_selector).map(element_text).collect();

        let image_url = self.extract_portrait(&document)?;
        let sections = Sections::from_paragraphs(&paragraphs);

        Ok(SaintRecord::new(
            name,
            image_url,
            sections.story,
            sections.reflection,
            sections.prayer,
        ))
    }

    /// Looks for the portrait inside the first `div.feature` only
    fn extract_portrait(&self, document: &Html) -> Result<Option<String>, ExtractionError> {
        let Some(feature) = document.select(&selector(FEATURE_SELECTOR)?).next() else {
            return Ok(None);
        };

        let portrait = feature
            .select(&selector(PORTRAIT_SELECTOR)?)
            .next()
            .and_then(|element| element.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(|src| self.resolve_image(src));
        Ok(portrait)
    }

    fn resolve_image(&self, src: &str) -> String {
        Url::parse(&self.origin)
            .and_then(|origin| origin.join(src))
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", self.origin, src))
    }
}

/// Story, reflection, and prayer cut from a paragraph list by position
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Sections {
    pub story: String,
    pub reflection: String,
    pub prayer: String,
}

impl Sections {
    /// Splits paragraphs by position
    ///
    /// With `N` paragraphs: the story is the first `max(N-4, 0)` joined by a
    /// blank line with empty ones skipped, the reflection is `P[N-3]` when
    /// `N >= 3`, and the prayer is `P[N-1]` when `N >= 1`. Paragraphs are
    /// taken as already trimmed.
    pub fn from_paragraphs(paragraphs: &[String]) -> Self {
        let n = paragraphs.len();

        let story = paragraphs[..n.saturating_sub(4)]
            .iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        let at = |index: Option<usize>| {
            index
                .and_then(|i| paragraphs.get(i))
                .cloned()
                .unwrap_or_default()
        };

        Self {
            story,
            reflection: at(n.checked_sub(3)),
            prayer: at(n.checked_sub(1)),
        }
    }
}

/// Returns the saint page links of a list page, or `None` for a single-saint page
///
/// Links are resolved against `base_url` and returned in document order.
/// Links that cannot be resolved to HTTP(S) URLs are skipped.
pub fn saints_list_links(html: &str, base_url: &Url) -> Result<Option<Vec<Url>>, ExtractionError> {
    let document = Html::parse_document(html);

    let Some(list) = document.select(&selector(SAINTS_LIST_SELECTOR)?).next() else {
        return Ok(None);
    };

    let link_selector = selector(LINK_SELECTOR)?;
    let links = list
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect();

    Ok(Some(links))
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None for empty hrefs, fragment-only links, non-HTTP schemes, and
/// hrefs that do not parse.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        Ok(url) => {
            tracing::debug!("Skipping non-HTTP saint link {}", url);
            None
        }
        Err(e) => {
            tracing::debug!("Skipping unparseable saint link {}: {}", href, e);
            None
        }
    }
}

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector(format!("{}: {:?}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
