//! Command name matching for autocomplete.
//!
//! A query matches a name when the name starts with it, or when it starts
//! right after one of the [`SEPARATORS`]. Matching ignores ASCII case.

use std::cmp::Ordering;
use std::ops::Range;

/// Characters that split a command name into tokens.
pub const SEPARATORS: [char; 6] = ['.', '_', '-', '/', '\\', ':'];

/// How a name matched the query. Earlier variants rank higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    /// The name starts with the query.
    Prefix,
    /// A token after a separator starts with the query.
    TokenBoundary,
}

/// Result of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub kind: MatchKind,
    /// Byte range of the matched text inside the name.
    pub range: Range<usize>,
}

/// Match `query` against a command `name`.
///
/// An empty query matches nothing, and neither does a name equal to the
/// query: there is nothing left to complete.
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::{match_command, MatchKind};
///
/// assert_eq!(match_command("sce", "scene.load").unwrap().kind, MatchKind::Prefix);
/// assert_eq!(match_command("load", "scene.load").unwrap().kind, MatchKind::TokenBoundary);
/// assert!(match_command("oad", "scene.load").is_none());
/// assert!(match_command("help", "HELP").is_none());
/// ```
pub fn match_command(query: &str, name: &str) -> Option<MatchResult> {
    if query.is_empty() || query.len() > name.len() || name.eq_ignore_ascii_case(query) {
        return None;
    }

    let starts_at = |at: usize| {
        name.get(at..at + query.len())
            .is_some_and(|slice| slice.eq_ignore_ascii_case(query))
    };

    if starts_at(0) {
        return Some(MatchResult {
            kind: MatchKind::Prefix,
            range: 0..query.len(),
        });
    }

    name.char_indices()
        .filter(|(_, c)| SEPARATORS.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .find(|&start| starts_at(start))
        .map(|start| MatchResult {
            kind: MatchKind::TokenBoundary,
            range: start..start + query.len(),
        })
}

/// Compare two matched names for display order.
///
/// Prefix matches come before token-boundary matches; ties sort by name,
/// ignoring case.
pub fn compare_matches(a: (&str, &MatchResult), b: (&str, &MatchResult)) -> Ordering {
    a.1.kind
        .cmp(&b.1.kind)
        .then_with(|| cmp_ignore_ascii_case(a.0, b.0))
        .then_with(|| a.0.cmp(b.0))
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Match and rank a list of candidate names.
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::match_and_sort;
///
/// let names = ["log.filter", "load", "scene.load", "help"];
/// let ranked: Vec<_> = match_and_sort("lo", names).into_iter().map(|(n, _)| n).collect();
/// assert_eq!(ranked, vec!["load", "log.filter", "scene.load"]);
/// ```
pub fn match_and_sort<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<(&'a str, MatchResult)> {
    let mut results: Vec<_> = candidates
        .into_iter()
        .filter_map(|name| match_command(query, name).map(|m| (name, m)))
        .collect();

    results.sort_by(|a, b| compare_matches((a.0, &a.1), (b.0, &b.1)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        let m = match_command("sce", "scene.load").unwrap();
        assert_eq!(m.kind, MatchKind::Prefix);
        assert_eq!(m.range, 0..3);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(match_command("SCE", "scene.load").unwrap().kind, MatchKind::Prefix);
        assert_eq!(match_command("sce", "Scene.Load").unwrap().kind, MatchKind::Prefix);
    }

    #[test]
    fn test_token_boundary_each_separator() {
        for sep in SEPARATORS {
            let name = format!("scene{sep}load");
            let m = match_command("lo", &name).unwrap();
            assert_eq!(m.kind, MatchKind::TokenBoundary, "separator {sep:?}");
            assert_eq!(m.range, 6..8);
        }
    }

    #[test]
    fn test_no_mid_token_match() {
        assert!(match_command("cene", "scene.load").is_none());
        assert!(match_command("ad", "scene.load").is_none());
        assert!(match_command("x", "scene.load").is_none());
    }

    #[test]
    fn test_exact_and_empty_excluded() {
        assert!(match_command("help", "help").is_none());
        assert!(match_command("Help", "hElp").is_none());
        assert!(match_command("", "help").is_none());
        assert!(match_command("helper", "help").is_none());
    }

    #[test]
    fn test_match_and_sort_ranking() {
        let names = [
            "time.scale",
            "scale",
            "scene.scale",
            "Scale.reset",
            "scalar",
            "help",
        ];
        let ranked: Vec<_> = match_and_sort("sca", names)
            .into_iter()
            .map(|(name, m)| (name, m.kind))
            .collect();

        assert_eq!(
            ranked,
            vec![
                ("scalar", MatchKind::Prefix),
                ("scale", MatchKind::Prefix),
                ("Scale.reset", MatchKind::Prefix),
                ("scene.scale", MatchKind::TokenBoundary),
                ("time.scale", MatchKind::TokenBoundary),
            ]
        );
    }

    #[test]
    fn test_non_ascii_names() {
        assert!(match_command("é", "café").is_none());
        assert_eq!(match_command("ü", "x.über").unwrap().kind, MatchKind::TokenBoundary);
    }
}
