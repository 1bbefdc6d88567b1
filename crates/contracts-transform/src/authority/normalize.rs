//! Canonical form of local authority names.
//!
//! Buyer names in Contracts Finder are free text ("LONDON BOROUGH OF HACKNEY",
//! "Hackney Council", "The Council of the City of Bristol"). Both sides of a
//! registry lookup go through [`normalize_authority_name`] so that these
//! spellings meet on one key.

/// Leading designations dropped after an optional "the". Longest first.
const PREFIXES: &[&str] = &[
    "council of the city of",
    "city and county of",
    "metropolitan borough of",
    "london borough of",
    "royal borough of",
    "borough of",
    "county of",
    "city of",
];

/// Trailing designations. Longest first so "county council" wins over "council".
const SUFFIXES: &[&str] = &[
    "metropolitan borough council",
    "metropolitan district council",
    "unitary authority",
    "borough council",
    "district council",
    "county council",
    "city council",
    "corporation",
    "council",
];

/// Lowercases, spells out `&`, drops apostrophes, turns other punctuation
/// into spaces and collapses whitespace.
pub fn fold_name(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace('&', " and ");
    let cleaned: String = lowered
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key for an authority name.
///
/// Folds the name, then strips one leading designation and one trailing
/// designation. When stripping would leave nothing ("Council"), the folded
/// form is returned unchanged.
pub fn normalize_authority_name(raw: &str) -> String {
    let folded = fold_name(raw);
    let mut name = folded.as_str();

    if let Some(rest) = strip_word_prefix(name, "the") {
        name = rest;
    }
    if let Some(rest) = PREFIXES.iter().find_map(|p| strip_word_prefix(name, p)) {
        name = rest;
    }
    if let Some(rest) = SUFFIXES.iter().find_map(|s| strip_word_suffix(name, s)) {
        name = rest;
    }

    if name.is_empty() {
        folded
    } else {
        name.to_string()
    }
}

fn strip_word_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix)?.strip_prefix(' ')
}

fn strip_word_suffix<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    name.strip_suffix(suffix)?.strip_suffix(' ')
}
