//! Profile registry. Loads the built-in profiles from embedded TOML.
//!
//! Each `.toml` file in `packages/convert/profiles/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a new layout is as
//! simple as creating a new TOML file and adding it to the list below.

use crate::profile::{Profile, parse_profile_toml};

/// TOML profiles embedded at compile time.
const PROFILE_TOMLS: &[(&str, &str)] = &[
    // ── Scanned statements ───────────────────────────────────────────
    ("krona_ocr", include_str!("../profiles/krona_ocr.toml")),
    ("ocr_regex", include_str!("../profiles/ocr_regex.toml")),
    // ── Digital statements ───────────────────────────────────────────
    ("native_text", include_str!("../profiles/native_text.toml")),
    ("native_table", include_str!("../profiles/native_table.toml")),
];

/// Profile used when none is selected.
pub const DEFAULT_PROFILE: &str = "krona_ocr";

/// Returns all built-in profiles, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML profile is malformed (the profiles are embedded,
/// so this is caught by the tests below).
#[must_use]
pub fn all_profiles() -> Vec<Profile> {
    PROFILE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_profile_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the built-in profile with the given id.
#[must_use]
pub fn find_profile(id: &str) -> Option<Profile> {
    all_profiles().into_iter().find(|p| p.id == id)
}
