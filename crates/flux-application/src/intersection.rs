//! Id set intersection for multi-token queries.

use flux_core::search::IdSet;

/// Ids present in every set, in the order of the first set.
///
/// Returns an empty list when there are no sets or any set is empty.
pub fn intersect_id_sets(sets: &[IdSet]) -> Vec<String> {
    let Some((first, rest)) = sets.split_first() else {
        return Vec::new();
    };

    if sets.iter().any(IdSet::is_empty) {
        return Vec::new();
    }

    first
        .iter()
        .filter(|id| rest.iter().all(|set| set.contains(id)))
        .map(str::to_string)
        .collect()
}
