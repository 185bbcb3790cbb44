//! Ingredient text formatting for display.

/// Shown when nothing has been detected.
pub const EMPTY_PLACEHOLDER: &str = "No ingredients detected yet";

/// Split raw service text into trimmed, non-empty lines, in order.
pub fn ingredient_lines(raw: &str) -> Vec<String> {
    raw.split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| line.trim().to_string())
        .collect()
}

/// Bulleted rendering, or the placeholder for empty text.
pub fn format_ingredients(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return vec![EMPTY_PLACEHOLDER.to_string()];
    }
    ingredient_lines(raw)
        .into_iter()
        .map(|line| format!("\u{2022} {line}"))
        .collect()
}
