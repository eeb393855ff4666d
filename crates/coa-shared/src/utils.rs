//! Utility functions

/// Case-insensitive display-name comparison, tolerant of stray whitespace.
/// Account names are matched this way everywhere a name is a lookup key.
pub fn name_matches(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches_ignores_case_and_whitespace() {
        assert!(name_matches("Current Assets", "current assets"));
        assert!(name_matches(" Cash & Bank ", "CASH & BANK"));
        assert!(!name_matches("Cash", "Cash Equivalents"));
    }
}
