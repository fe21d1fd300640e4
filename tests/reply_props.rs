//! Property tests for reply cleanup (pure, no backend).

include!("common/proptest_prelude.rs");

use cinesleuth::game::sanitize;
use proptest::prelude::*;

/// Words that cannot themselves form markdown.
fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,12}"
}

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Property: cleaning twice is the same as cleaning once.
    #[test]
    fn prop_sanitize_is_idempotent(raw in "[a-zA-Z0-9 *_#`\\n]{0,80}") {
        let once = sanitize(&raw);
        prop_assert_eq!(sanitize(&once), once);
    }

    /// Property: output is trimmed and never holds a run of blank lines.
    #[test]
    fn prop_sanitize_output_is_tidy(raw in "[a-zA-Z0-9 *_#`\\n]{0,80}") {
        let cleaned = sanitize(&raw);
        prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        prop_assert!(!cleaned.contains("\n\n\n"));
    }

    /// Property: every emphasis, code and heading wrapper is stripped from a word.
    #[test]
    fn prop_sanitize_strips_wrappers(w in word(), pick in 0usize..6) {
        let wrapped = match pick {
            0 => format!("**{}**", w),
            1 => format!("*{}*", w),
            2 => format!("__{}__", w),
            3 => format!("_{}_", w),
            4 => format!("`{}`", w),
            _ => format!("### {}", w),
        };
        prop_assert_eq!(sanitize(&wrapped), w.clone());

        if pick < 5 {
            let sentence = format!("Is it {} today?", wrapped);
            prop_assert_eq!(sanitize(&sentence), format!("Is it {} today?", w));
        }
    }
}
