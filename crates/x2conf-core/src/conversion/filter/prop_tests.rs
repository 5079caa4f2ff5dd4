//! Property-based tests for filter chain parsing
//!
//! These tests verify that parsing never panics and that quoted text is
//! never split.

#[cfg(test)]
mod tests {
    use crate::conversion::filter::{split_top_level, FilterChain, FilterInvocation};
    use proptest::prelude::*;

    fn filter_name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,12}"
    }

    /// Quoted argument text that may contain separators
    fn quoted_argument() -> impl Strategy<Value = String> {
        "[a-z0-9|,() /]{0,16}".prop_map(|s| format!("'{}'", s))
    }

    fn stage() -> impl Strategy<Value = String> {
        prop_oneof![
            filter_name(),
            (filter_name(), quoted_argument()).prop_map(|(n, a)| format!("{}({})", n, a)),
        ]
    }

    proptest! {
        #[test]
        fn parse_never_panics(input in ".{0,64}") {
            let _ = FilterChain::parse(&input);
            let _ = FilterInvocation::parse(&input);
            let _ = split_top_level(&input, '|');
        }

        #[test]
        fn well_formed_chains_keep_their_stages(stages in prop::collection::vec(stage(), 1..6)) {
            let text = stages.join(" | ");
            let chain = FilterChain::parse(&text).unwrap();

            prop_assert_eq!(chain.len(), stages.len());
            for (parsed, raw) in chain.stages().iter().zip(&stages) {
                prop_assert!(raw.starts_with(&parsed.name));
            }
        }

        #[test]
        fn quoted_argument_survives_intact(name in filter_name(), arg in "[a-z0-9|, ]{0,16}") {
            let text = format!("{}('{}') | upper", name, arg);
            let chain = FilterChain::parse(&text).unwrap();

            prop_assert_eq!(chain.len(), 2);
            prop_assert_eq!(chain.stages()[0].argument(), Some(arg));
        }
    }
}
