//! Platform tag handling.
//!
//! A game's platforms are logically an ordered list of tags; the database
//! keeps them as one comma-joined column. Splitting and joining happen only
//! here, at the boundary.

/// The platform vocabulary tracked by the statistics, in display order.
/// Tokens outside this list are accepted on games but dropped from the
/// platform distribution.
pub const PLATFORM_VOCABULARY: [&str; 12] = [
    "DIGITALE", "FISICO", "PS1", "PS2", "PS3", "PS4", "PS5", "PC", "SWITCH", "3DS", "GBA", "WII",
];

/// Split a stored comma-joined platform column into tags.
pub fn split_platforms(column: &str) -> Vec<String> {
    column
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Join tags back into the stored column form.
pub fn join_platforms(tags: &[String]) -> String {
    tags.join(", ")
}

/// Order tags for display: FISICO first, then DIGITALE, then the remaining
/// tags in their original order.
pub fn display_order(tags: &[String]) -> Vec<String> {
    let mut ordered = Vec::with_capacity(tags.len());
    for ownership in ["FISICO", "DIGITALE"] {
        for tag in tags {
            if tag.eq_ignore_ascii_case(ownership) {
                ordered.push(tag.clone());
            }
        }
    }
    for tag in tags {
        if !tag.eq_ignore_ascii_case("FISICO") && !tag.eq_ignore_ascii_case("DIGITALE") {
            ordered.push(tag.clone());
        }
    }
    ordered
}
