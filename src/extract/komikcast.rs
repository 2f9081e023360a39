//! Extractor for the komikcast site family
//!
//! Structurally a sibling of komikindo with its own markup: listing cards
//! are `.list-update_item`, detail pages use the `komik_info-*` class
//! family, and reader pages keep images under `.main-reading-area`.

use crate::catalog::SeedEntry;
use crate::extract::timeparse::parse_relative_time;
use crate::extract::{sel, squash_ws, SiteExtractor};
use crate::model::{ChapterStub, ComicDetail};
use crate::ExtractError;
use indexmap::IndexMap;
use scraper::Html;

pub struct KomikcastExtractor;

impl SiteExtractor for KomikcastExtractor {
    fn name(&self) -> &'static str {
        "komikcast"
    }

    fn parse_detail(&self, html: &str, url: &str) -> Result<ComicDetail, ExtractError> {
        let document = Html::parse_document(html);

        let title_sel = sel("h1.komik_info-content-body-title")?;
        let title = document
            .select(&title_sel)
            .next()
            .map(|e| squash_ws(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .ok_or(ExtractError::NoContent {
                url: url.to_string(),
                what: "comic detail",
            })?;

        let genre_sel = sel(".komik_info-content-genre a")?;
        let genres: Vec<String> = document
            .select(&genre_sel)
            .map(|a| squash_ws(&a.text().collect::<String>()))
            .filter(|g| !g.is_empty())
            .collect();

        let synopsis_sel = sel(".komik_info-description-sinopsis p")?;
        let synopsis = document
            .select(&synopsis_sel)
            .next()
            .map(|p| squash_ws(&p.text().collect::<String>()))
            .unwrap_or_default();

        let attributes = extract_attributes(&document)?;

        let cover_sel = sel(".komik_info-cover-image img")?;
        let cover_url = document
            .select(&cover_sel)
            .next()
            .and_then(|img| img.value().attr("src").or(img.value().attr("data-src")))
            .map(str::to_string);

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

        let image_sel = sel(".main-reading-area img")?;
        let images: Vec<String> = document
            .select(&image_sel)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| src.starts_with("http"))
            .map(str::to_string)
            .collect();

        if images.is_empty() {
            return Err(ExtractError::NoContent {
                url: url.to_string(),
                what: "chapter images",
            });
        }

        Ok(images)
    }

    fn parse_listing(&self, html: &str, _url: &str) -> Result<Vec<SeedEntry>, ExtractError> {
        let document = Html::parse_document(html);

        let item_sel = sel(".list-update_item")?;
        let link_sel = sel("a[href]")?;
        let title_sel = sel("h3.title")?;
        let img_sel = sel("img.ts-post-image")?;
        let score_sel = sel(".numscore")?;

        let mut entries = Vec::new();

        for item in document.select(&item_sel) {
            let anchor = match item.select(&link_sel).next() {
                Some(a) => a,
                None => continue,
            };
            let link = anchor.value().attr("href").unwrap_or("").to_string();
            if link.is_empty() {
                continue;
            }

            let title = match item.select(&title_sel).next() {
                Some(h3) => squash_ws(&h3.text().collect::<String>()),
                None => continue,
            };
            if title.is_empty() {
                continue;
            }

            let image = item
                .select(&img_sel)
                .next()
                .and_then(|img| img.value().attr("src").or(img.value().attr("data-src")))
                .map(str::to_string);

            let rating = item
                .select(&score_sel)
                .next()
                .map(|score| squash_ws(&score.text().collect::<String>()))
                .filter(|r| !r.is_empty());

            entries.push(SeedEntry {
                title,
                link,
                slug: None,
                image,
                kind: None,
                rating,
            });
        }

        Ok(entries)
    }
}

fn extract_attributes(document: &Html) -> Result<IndexMap<String, String>, ExtractError> {
    let span_sel = sel(".komik_info-content-info span, .komik_info-content-meta span")?;

    let mut attributes = IndexMap::new();

    for span in document.select(&span_sel) {
        let text = squash_ws(&span.text().collect::<String>());

        for (label, key) in [
            ("Status:", "Status"),
            ("Type:", "Type"),
            ("Author:", "Author"),
        ] {
            if let Some(value) = text.strip_prefix(label) {
                attributes.insert(key.to_string(), value.trim().to_string());
            }
        }
    }

    Ok(attributes)
}

fn extract_chapters(document: &Html) -> Result<Vec<ChapterStub>, ExtractError> {
    let item_sel = sel(".komik_info-chapters li")?;
    let link_sel = sel("a.chapter-link-item")?;
    let time_sel = sel(".chapter-link-time")?;

    let mut chapters = Vec::new();

    for li in document.select(&item_sel) {
        let anchor = match li.select(&link_sel).next() {
            Some(a) => a,
            None => continue,
        };

        let title = squash_ws(&anchor.text().collect::<String>());
        let url = anchor.value().attr("href").unwrap_or("").to_string();
        if title.is_empty() || url.is_empty() {
            continue;
        }

        let released = li
            .select(&time_sel)
            .next()
            .map(|t| squash_ws(&t.text().collect::<String>()))
            .unwrap_or_default();

        chapters.push(ChapterStub {
            title,
            url,
            published_at: parse_relative_time(&released),
        });
    }

    Ok(chapters)
}
