//! Avatar initials.

/// First letter of every word, uppercased. `"Anika Rahman Chowdhury"` → `"ARC"`.
///
/// Returns an empty string for a blank name; callers fall back to an icon.
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// First and last word initials, or the first two characters of a one-word
/// name. `"Fazle Rabbi Khan"` → `"FK"`, `"sadia"` → `"SA"`.
#[must_use]
pub fn short_initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => String::new(),
        [single] => single.chars().take(2).flat_map(char::to_uppercase).collect(),
        [first, .., last] => first
            .chars()
            .take(1)
            .chain(last.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect(),
    }
}
