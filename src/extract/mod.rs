//! Site extractors: page → typed record
//!
//! Everything selector-specific lives here, behind the `SiteExtractor`
//! trait. The harvest pipeline hands an extractor raw HTML and gets back
//! typed records; it never sees a CSS selector. One implementation exists
//! per supported source site.

mod komikcast;
mod komikindo;
mod timeparse;

pub use komikcast::KomikcastExtractor;
pub use komikindo::KomikindoExtractor;
pub use timeparse::{parse_relative_time, parse_relative_time_at};

use crate::catalog::SeedEntry;
use crate::model::ComicDetail;
use crate::ExtractError;
use scraper::Selector;

/// Parses the pages of one source site into typed records
///
/// Implementations are pure: they receive HTML that has already been
/// fetched (and retried) by the shared fetcher, and only extract.
pub trait SiteExtractor: Send + Sync {
    /// Short site identifier, as used in the config
    fn name(&self) -> &'static str;

    /// Parses a comic detail page: metadata plus the chapter listing
    fn parse_detail(&self, html: &str, url: &str) -> Result<ComicDetail, ExtractError>;

    /// Parses a chapter reader page into its ordered image URLs
    ///
    /// An empty result is an error: a chapter without images must never
    /// become a success record.
    fn parse_chapter_images(&self, html: &str, url: &str) -> Result<Vec<String>, ExtractError>;

    /// Parses one page of the paginated catalog listing
    ///
    /// An empty result is normal here: it is how the catalog builder
    /// detects the end of the pagination.
    fn parse_listing(&self, html: &str, url: &str) -> Result<Vec<SeedEntry>, ExtractError>;
}

/// Returns the extractor for a configured site name
pub fn select(site: &str) -> Option<Box<dyn SiteExtractor>> {
    match site {
        "komikindo" => Some(Box::new(KomikindoExtractor)),
        "komikcast" => Some(Box::new(KomikcastExtractor)),
        _ => None,
    }
}

/// Compiles a CSS selector, mapping parse failures to a typed error
pub(crate) fn sel(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

/// Collapses whitespace runs in element text to single spaces
pub(crate) fn squash_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
