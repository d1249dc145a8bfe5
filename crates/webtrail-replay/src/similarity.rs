//! Text similarity used by the text and visual strategies.

use std::collections::HashMap;

/// Lowercase with whitespace collapsed.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Similarity in `0..=1` between two visible-text snippets.
///
/// Equal after normalization scores 1.0; containment scores by length ratio
/// with a floor of 0.6; anything else uses the Dice coefficient over
/// character bigrams.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };
    if longer.contains(shorter.as_str()) {
        let ratio = shorter.chars().count() as f64 / longer.chars().count() as f64;
        return 0.6 + 0.35 * ratio;
    }
    dice(&a, &b)
}

fn bigrams(text: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = HashMap::new();
    for pair in chars.windows(2) {
        *out.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    out
}

fn dice(a: &str, b: &str) -> f64 {
    let (ga, gb) = (bigrams(a), bigrams(b));
    let total: usize = ga.values().sum::<usize>() + gb.values().sum::<usize>();
    if total == 0 {
        return 0.0;
    }
    let shared: usize = ga
        .iter()
        .map(|(gram, n)| (*n).min(gb.get(gram).copied().unwrap_or(0)))
        .sum();
    2.0 * shared as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_ignores_case_and_spacing() {
        assert_eq!(text_similarity("Sign  In", "sign in"), 1.0);
    }

    #[test]
    fn test_empty_never_matches() {
        assert_eq!(text_similarity("", "Save"), 0.0);
        assert_eq!(text_similarity("  ", ""), 0.0);
    }

    #[test]
    fn test_containment_beats_fuzzy() {
        let contained = text_similarity("Save", "Save draft");
        assert!(contained > 0.6 && contained < 1.0);
        assert!(contained > text_similarity("Save", "Sale"));
    }

    #[test]
    fn test_unrelated_text_scores_low() {
        assert!(text_similarity("Vanished button", "Sign in") < 0.3);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [("Checkout now", "Check out"), ("Log in", "Login"), ("a", "ab")];
        for (a, b) in pairs {
            assert!((text_similarity(a, b) - text_similarity(b, a)).abs() < 1e-12);
        }
    }
}
