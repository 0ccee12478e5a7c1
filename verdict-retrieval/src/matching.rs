//! Subsequence matching between a query action sequence and the pattern
//! index.

use verdict_core::models::{MatchType, PatternMatch};
use verdict_core::subsequence::is_subsequence;
use verdict_knowledge::index::PatternIndex;

/// Match `query` against every indexed pattern subsequence.
///
/// Three relations are recognized, in priority order: the query equals the
/// pattern, the query is contained in the pattern, or the pattern is
/// contained in the query. `match_length` is the length of the contained
/// side. Results are ranked by descending match length, then descending
/// match-type priority, then ascending pattern ID.
pub fn find_matches(index: &PatternIndex, query: &[String]) -> Vec<PatternMatch> {
    if query.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (key, pattern_ids) in index.entries() {
        let (match_type, match_length) = if key.as_slice() == query {
            (MatchType::Exact, query.len())
        } else if is_subsequence(query, key) {
            (MatchType::ContainsInput, query.len())
        } else if is_subsequence(key, query) {
            (MatchType::ContainedByInput, key.len())
        } else {
            continue;
        };

        for &pattern_id in pattern_ids {
            matches.push(PatternMatch {
                pattern_id,
                match_length,
                match_type,
            });
        }
    }

    matches.sort_by(|a, b| {
        b.match_length
            .cmp(&a.match_length)
            .then_with(|| b.match_type.priority().cmp(&a.match_type.priority()))
            .then_with(|| a.pattern_id.cmp(&b.pattern_id))
    });
    matches
}
