//! Stable key derivation for comics and chapters
//!
//! Slugs identify documents in the object store and chapters within a comic,
//! so the derivation must stay stable across runs: the same title always
//! yields the same slug.

use once_cell::sync::Lazy;
use regex::Regex;

// Characters that are unsafe in store paths or meaningless in a key
static STRIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/*?:"<>|'`!@#$%^&()\[\]{}=+~,]"#).expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static REPEATED_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

/// Derives a stable, URL- and filesystem-safe key from a title
///
/// Punctuation is stripped, whitespace runs collapse to a single separator,
/// the result is lowercased and hyphen-joined, and duplicate or edge hyphens
/// are removed.
///
/// # Examples
///
/// ```
/// use komitana::catalog::slugify;
///
/// assert_eq!(slugify("Solo Leveling"), "solo-leveling");
/// assert_eq!(slugify("  The   Gamer!  "), "the-gamer");
/// assert_eq!(slugify("Chapter 10.5"), "chapter-10.5");
/// ```
pub fn slugify(name: &str) -> String {
    let cleaned = STRIP.replace_all(name, "");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim().replace(' ', "-").to_lowercase();
    let cleaned = REPEATED_DASH.replace_all(&cleaned, "-");
    cleaned.trim_matches('-').to_string()
}
