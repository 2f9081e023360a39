//! Domain and wire types shared across the harvester
//!
//! # Components
//!
//! - `ComicDetail` / `ChapterStub`: what extractors read off a detail page
//! - `ChapterRecord` / `ChapterSet`: persisted chapter content per comic
//! - `ComicMetadata`: persisted comic metadata document
//! - `ComicRecord`: run output element

mod records;

// Re-export main types
pub use records::{
    ChapterRecord, ChapterSet, ChapterStub, ComicDetail, ComicMetadata, ComicRecord,
};
