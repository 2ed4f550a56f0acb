fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grouping key for full names: trimmed, lowercased, inner whitespace collapsed.
pub fn name_key(full_name: &str) -> String {
    collapse_whitespace(&full_name.trim().to_lowercase())
}

/// Grouping key for property addresses: the name rules plus `.` and `,` removed.
pub fn address_key(address: &str) -> String {
    collapse_whitespace(&address.trim().to_lowercase())
        .chars()
        .filter(|c| !matches!(c, '.' | ','))
        .collect()
}
