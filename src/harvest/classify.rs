//! Completion classification
//!
//! A comic whose source marks it finished and whose stored chapter count
//! covers everything the source offers needs no further fetching, ever.
//! Skipping those is the main cost control for a growing catalog: a rescan
//! pays one metadata read instead of a detail-page fetch per finished comic.

/// Status values (case-insensitive, containment match) that mean a comic
/// will receive no further chapters. "tamat" is the Indonesian sites'
/// wording for completed.
const FINISHED_TOKENS: &[&str] = &["complete", "tamat", "finished", "end"];

/// Returns true if a status string marks the comic as finished
pub fn is_finished_status(status: &str) -> bool {
    let status = status.to_lowercase();
    FINISHED_TOKENS.iter().any(|token| status.contains(token))
}

/// Decides whether a comic is terminally complete
///
/// Terminal iff the status is a finished vocabulary match AND the stored
/// chapter count covers the total last observed from the source. A missing
/// status or a count shortfall is never terminal.
pub fn is_terminally_complete(
    status: Option<&str>,
    stored_count: usize,
    observed_total: usize,
) -> bool {
    match status {
        Some(s) if is_finished_status(s) => stored_count >= observed_total,
        _ => false,
    }
}
