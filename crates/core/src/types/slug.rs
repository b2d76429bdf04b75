//! URL slugs for products.

/// Derive a product slug from its name.
///
/// Lowercases, turns each run of whitespace into a single `-`, then drops
/// every character outside `[a-z0-9_-]`.
///
/// ```
/// use afrah_core::create_slug;
///
/// assert_eq!(create_slug("Premium Ajwa Dates (500g)"), "premium-ajwa-dates-500g");
/// ```
#[must_use]
pub fn create_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(create_slug("Pure   Gur\tBlock"), "pure-gur-block");
    }

    #[test]
    fn test_strips_punctuation_but_keeps_hyphen_and_underscore() {
        assert_eq!(create_slug("Mixed Nuts, 1kg!"), "mixed-nuts-1kg");
        assert_eq!(create_slug("chia_seeds-v2"), "chia_seeds-v2");
    }

    #[test]
    fn test_edges_keep_hyphens() {
        assert_eq!(create_slug(" Shutki "), "-shutki-");
        assert_eq!(create_slug("Dates - Medjool"), "dates---medjool");
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(create_slug("খেজুর Dates"), "-dates");
    }
}
