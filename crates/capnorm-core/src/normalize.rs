//! Label → identifier normalization.
//!
//! A label such as `"Deploy to Prod"` becomes `deploy_to_prod`. Only spaces and
//! hyphens are treated as separators; every other character passes through
//! untouched, so `"CI/CD Pipeline"` becomes `ci/cd_pipeline`.

/// Canonicalize a display label into a machine identifier.
///
/// Trims surrounding whitespace, lowercases, then maps each `' '` and `'-'`
/// to a single `'_'`. Runs of separators are not collapsed.
pub fn normalize(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// True if `label` is already in canonical form.
pub fn is_canonical(label: &str) -> bool {
    normalize(label) == label
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn multi_word_labels() {
        assert_eq!(normalize("Code Review"), "code_review");
        assert_eq!(normalize("Deploy to Prod"), "deploy_to_prod");
        assert_eq!(normalize("System Architecture Review"), "system_architecture_review");
    }

    #[test]
    fn hyphens_become_underscores() {
        assert_eq!(normalize("Follow-Up Call"), "follow_up_call");
        assert_eq!(normalize("re-run"), "re_run");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(normalize("  Git Push \n"), "git_push");
    }

    #[test]
    fn other_punctuation_passes_through() {
        assert_eq!(normalize("CI/CD Pipeline"), "ci/cd_pipeline");
        assert_eq!(normalize("Q&A"), "q&a");
    }

    #[test]
    fn empty_and_canonical_inputs_are_unchanged() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("issue_alpha_directive"), "issue_alpha_directive");
        assert!(is_canonical("git_push"));
        assert!(is_canonical(""));
        assert!(!is_canonical("Git Push"));
    }

    #[test]
    fn separator_runs_are_not_collapsed() {
        assert_eq!(normalize("a  b"), "a__b");
        assert_eq!(normalize("a - b"), "a___b");
    }

    proptest! {
        #[test]
        fn output_has_no_spaces_hyphens_or_lowercasable_chars(label in r"[\PC\t]{0,40}") {
            let id = normalize(&label);
            prop_assert!(!id.contains(' '));
            prop_assert!(!id.contains('-'));
            // Some uppercase letters (e.g. U+03D2) have no lowercase mapping;
            // the output is canonical once lowercasing leaves it unchanged.
            prop_assert_eq!(id.to_lowercase(), id.clone());
        }

        #[test]
        fn ascii_output_has_no_uppercase(label in "[ -~]{0,40}") {
            let id = normalize(&label);
            prop_assert!(!id.chars().any(char::is_uppercase), "uppercase in {:?}", id);
        }

        #[test]
        fn normalize_is_idempotent(label in r"[\PC\t\n]{0,40}") {
            let once = normalize(&label);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(is_canonical(&once));
        }

        #[test]
        fn ascii_labels_keep_their_length_after_trim(label in "[A-Za-z -]{0,30}") {
            prop_assert_eq!(normalize(&label).len(), label.trim().len());
        }
    }

    #[test]
    fn unicode_labels_are_lowercased() {
        assert_eq!(normalize("Ünïcode Label"), "ünïcode_label");
        assert_eq!(normalize("ÀÉÎ-Plan"), "àéî_plan");
        assert_eq!(normalize("\u{3000}Deep Research\u{3000}"), "deep_research");
    }
}
