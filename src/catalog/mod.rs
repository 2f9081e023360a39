//! Catalog module: the crawl seed list and stable key derivation
//!
//! # Components
//!
//! - `SeedEntry`: one comic of the seed catalog (title + detail page URL)
//! - `slugify`: normalized, stable key derivation shared by comics and chapters
//! - `build_catalog`: walks the paginated site listing into a fresh catalog

mod builder;
mod seed;
mod slug;

// Re-export main types
pub use builder::build_catalog;
pub use seed::{load_catalog, save_catalog, SeedEntry};
pub use slug::slugify;
