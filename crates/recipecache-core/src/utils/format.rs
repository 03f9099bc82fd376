use std::cmp::Ordering;

/// Compare two strings case-insensitively without allocating.
/// Uses full Unicode lowercase folding, so "Éclair" sorts with "éclair".
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let lhs = a.chars().flat_map(char::to_lowercase);
    let rhs = b.chars().flat_map(char::to_lowercase);
    lhs.cmp(rhs)
}

/// Case-insensitive substring check.
/// An empty needle is contained in every haystack.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("apple pie", "Banana Bread"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Cherry Tart", "banana bread"), Ordering::Greater);
        assert_eq!(cmp_ignore_case("BeaverTails", "beavertails"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("Éclair", "éclair"), Ordering::Equal);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Apam Balik", "BALIK"));
        assert!(contains_ignore_case("Malaysian", "ays"));
        assert!(contains_ignore_case("Crème Brûlée", "BRÛL"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Pancakes", "waffle"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Tart", 10), "Tart");
        assert_eq!(truncate_string("Apple & Blackberry Crumble", 10), "Apple &...");
        assert_eq!(truncate_string("Pie", 2), "Pi");
        assert_eq!(truncate_string("Crème Brûlée", 8), "Crème...");
    }
}
