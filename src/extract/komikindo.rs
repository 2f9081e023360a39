//! Extractor for the komikindo site family
//!
//! Selector notes:
//! - Detail pages carry the title in `h1.entry-title` (prefixed "Komik "),
//!   genres under `div.genre-info`, attributes as labeled spans in
//!   `div.spe`, and the chapter list under `#chapter_list`.
//! - Reader pages have moved their image container several times, so image
//!   extraction walks a cascade of known selectors and takes the first that
//!   matches.

use crate::catalog::SeedEntry;
use crate::extract::timeparse::parse_relative_time;
use crate::extract::{sel, squash_ws, SiteExtractor};
use crate::model::{ChapterStub, ComicDetail};
use crate::ExtractError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

static KOMIK_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Komik\s*").expect("valid regex"));
static SYNOPSIS_BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^(Manhwa|Manhua|Manga)\s+[^.]+yang dibuat oleh[^.]+bercerita tentang\s*")
        .expect("valid regex")
});
static SYNOPSIS_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^.*?bercerita tentang\s*").expect("valid regex"));
static SLUG_FROM_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/komik/([^/]+)/?$").expect("valid regex"));
static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+-").expect("valid regex"));

/// Image container selectors, newest site layout first
const IMAGE_SELECTORS: &[&str] = &[
    "#chimg-auh img",
    ".chapter-image img",
    "#Baca_Komik img",
    ".img-landmine img",
    ".main-reading-area img",
];

pub struct KomikindoExtractor;

impl SiteExtractor for KomikindoExtractor {
    fn name(&self) -> &'static str {
        "komikindo"
    }

    fn parse_detail(&self, html: &str, url: &str) -> Result<ComicDetail, ExtractError> {
        let document = Html::parse_document(html);

        // Title is the one element we insist on; without it this is not a
        // detail page
        let title_sel = sel("h1.entry-title")?;
        let title = document
            .select(&title_sel)
            .next()
            .map(|e| squash_ws(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .ok_or(ExtractError::NoContent {
                url: url.to_string(),
                what: "comic detail",
            })?;
        let title = KOMIK_PREFIX.replace(&title, "").trim().to_string();

        let genres = extract_genres(&document)?;
        let synopsis = extract_synopsis(&document)?;
        let attributes = extract_attributes(&document)?;
        let cover_url = extract_cover(&document)?;
        let chapters = extract_chapters(&document)?;

        Ok(ComicDetail {
            title,
            genres,
            synopsis,
            attributes,
            cover_url,
            chapters,
        })
    }

    fn parse_chapter_images(&self, html: &str, url: &str) -> Result<Vec<String>, ExtractError> {
        let document = Html::parse_document(html);

        for css in IMAGE_SELECTORS {
            let selector = sel(css)?;
            let images: Vec<String> = document
                .select(&selector)
                .filter_map(|img| img.value().attr("src"))
                .map(str::trim)
                .filter(|src| src.starts_with("http"))
                .map(str::to_string)
                .collect();

            if !images.is_empty() {
                tracing::debug!("Found {} images using '{}'", images.len(), css);
                return Ok(images);
            }
        }

        Err(ExtractError::NoContent {
            url: url.to_string(),
            what: "chapter images",
        })
    }

    fn parse_listing(&self, html: &str, _url: &str) -> Result<Vec<SeedEntry>, ExtractError> {
        let document = Html::parse_document(html);

        // The A–Z list lives under listupd > film-list; the sidebar reuses
        // the same item markup and must not be picked up
        let post_sel = sel(".listupd .film-list .animepost")?;
        let inner_sel = sel(".animposx")?;
        let link_sel = sel("a[href]")?;
        let h3_sel = sel("h3")?;
        let img_sel = sel("img")?;
        let flag_sel = sel("span.typeflag")?;

        let mut entries = Vec::new();

        for post in document.select(&post_sel) {
            let inner = match post.select(&inner_sel).next() {
                Some(i) => i,
                None => continue,
            };

            let anchor = match inner.select(&link_sel).next() {
                Some(a) => a,
                None => continue,
            };

            let link = anchor.value().attr("href").unwrap_or("").to_string();
            if !link.contains("/komik/") {
                continue;
            }

            let slug = SLUG_FROM_URL
                .captures(&link)
                .map(|c| LEADING_DIGITS.replace(&c[1], "").to_string());

            // Title from the anchor attribute when present, else the card's h3
            let mut title = anchor.value().attr("title").unwrap_or("").to_string();
            if title.is_empty() {
                if let Some(h3) = inner.select(&h3_sel).next() {
                    title = h3.text().collect::<String>();
                }
            }
            let title = clean_listing_title(&title);
            if title.is_empty() {
                continue;
            }

            let image = inner
                .select(&img_sel)
                .next()
                .and_then(|img| img.value().attr("src").or(img.value().attr("data-src")))
                .map(str::to_string);

            let kind = post
                .select(&flag_sel)
                .next()
                .and_then(|flag| {
                    flag.value()
                        .classes()
                        .find(|c| matches!(*c, "Manhwa" | "Manga" | "Manhua"))
                })
                .map(str::to_string);

            entries.push(SeedEntry {
                title,
                link,
                slug,
                image,
                kind,
                rating: None,
            });
        }

        Ok(entries)
    }
}

/// Strips the "Komik " prefix and normalizes a listing title to plain ASCII
fn clean_listing_title(raw: &str) -> String {
    let title = KOMIK_PREFIX.replace(raw.trim(), "");
    let title: String = title
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\'' | '\u{fffd}' => ' ',
            c if !c.is_ascii() => ' ',
            c => c,
        })
        .collect();
    squash_ws(&title)
}

fn extract_genres(document: &Html) -> Result<Vec<String>, ExtractError> {
    let genre_sel = sel("div.genre-info a")?;
    Ok(document
        .select(&genre_sel)
        .map(|a| squash_ws(&a.text().collect::<String>()))
        .filter(|g| !g.is_empty())
        .collect())
}

fn extract_synopsis(document: &Html) -> Result<String, ExtractError> {
    let direct_sel = sel(".entry-content-sinopsis, .entry-content .sinopsis")?;

    let mut synopsis = document
        .select(&direct_sel)
        .next()
        .map(|e| e.text().collect::<String>())
        .unwrap_or_default();

    // Fallback: scan the content paragraphs for the first one that looks
    // like an actual synopsis rather than boilerplate
    if synopsis.trim().is_empty() {
        let para_sel = sel(".entry-content p")?;
        let paragraphs: Vec<String> = document
            .select(&para_sel)
            .map(|p| squash_ws(&p.text().collect::<String>()))
            .collect();

        synopsis = paragraphs
            .iter()
            .find(|t| t.len() > 50 && !t.contains("yang dibuat oleh komikus"))
            .or_else(|| paragraphs.iter().find(|t| t.len() > 20))
            .cloned()
            .unwrap_or_default();
    }

    // Strip the generated lead-in the site prepends to every synopsis,
    // then the shorter variant in case the full pattern missed
    let synopsis = SYNOPSIS_BOILERPLATE.replace(&synopsis, "");
    let synopsis = SYNOPSIS_TAIL.replace(&synopsis, "");

    Ok(squash_ws(&synopsis).trim_matches('"').trim().to_string())
}

fn extract_attributes(document: &Html) -> Result<IndexMap<String, String>, ExtractError> {
    let span_sel = sel("div.spe span")?;
    let link_sel = sel("a")?;

    let mut attributes = IndexMap::new();

    for span in document.select(&span_sel) {
        let text = squash_ws(&span.text().collect::<String>());

        if let Some(value) = text.strip_prefix("Status:") {
            attributes.insert("Status".to_string(), value.trim().to_string());
        }
        if text.starts_with("Jenis Komik:") {
            if let Some(kind) = first_link_text(&span, &link_sel) {
                attributes.insert("Type".to_string(), kind);
            }
        }
        if let Some(value) = text.strip_prefix("Pengarang:") {
            attributes.insert("Author".to_string(), value.trim().to_string());
        }
        if let Some(value) = text.strip_prefix("Ilustrator:") {
            attributes.insert("Illustrator".to_string(), value.trim().to_string());
        }
    }

    Ok(attributes)
}

fn first_link_text(span: &ElementRef, link_sel: &scraper::Selector) -> Option<String> {
    span.select(link_sel)
        .next()
        .map(|a| squash_ws(&a.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn extract_cover(document: &Html) -> Result<Option<String>, ExtractError> {
    let cover_sel = sel(".thumb img")?;
    Ok(document
        .select(&cover_sel)
        .next()
        .and_then(|img| img.value().attr("src").or(img.value().attr("data-src")))
        .map(str::to_string))
}

fn extract_chapters(document: &Html) -> Result<Vec<ChapterStub>, ExtractError> {
    let li_sel = sel("#chapter_list ul li")?;
    let title_sel = sel("span.lchx a")?;
    let date_sel = sel("span.dt")?;

    let mut chapters = Vec::new();

    for li in document.select(&li_sel) {
        let anchor = match li.select(&title_sel).next() {
            Some(a) => a,
            None => continue,
        };

        let title = squash_ws(&anchor.text().collect::<String>());
        let url = anchor.value().attr("href").unwrap_or("").to_string();
        if title.is_empty() || url.is_empty() {
            continue;
        }

        let released = li
            .select(&date_sel)
            .next()
            .map(|dt| squash_ws(&dt.text().collect::<String>()))
            .unwrap_or_default();

        chapters.push(ChapterStub {
            title,
            url,
            published_at: parse_relative_time(&released),
        });
    }

    Ok(chapters)
}
