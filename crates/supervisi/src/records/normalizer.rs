/// Comparison form of a school name: zero-width characters stripped, whitespace collapsed,
/// lowercased.
pub fn normalize_school_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

pub fn same_school(left: &str, right: &str) -> bool {
    let left = normalize_school_name(left);
    !left.is_empty() && left == normalize_school_name(right)
}
