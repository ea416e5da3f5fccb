use std::collections::BTreeMap;

/// Folds the legacy evidence map into the v2 map; v2 wins when both carry the same id.
pub fn merge_evidence(
    legacy: BTreeMap<String, String>,
    v2: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    merge_generations(legacy, v2)
}

/// Same precedence rule as [`merge_evidence`] for the supervisor score maps.
pub fn merge_scores(
    legacy: BTreeMap<String, u32>,
    v2: BTreeMap<String, u32>,
) -> BTreeMap<String, u32> {
    merge_generations(legacy, v2)
}

fn merge_generations<V>(
    mut legacy: BTreeMap<String, V>,
    v2: BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    legacy.extend(v2);
    legacy
}
