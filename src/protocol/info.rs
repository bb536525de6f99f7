use std::collections::HashMap;

/// Parse the `INFO` reply into field/value pairs.
/// Section headers(`# Server`) and malformed lines are skipped.
pub fn parse_info(reply: &str) -> HashMap<String, String> {
    reply
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(field, value)| (field.to_owned(), value.to_owned()))
        .collect()
}
