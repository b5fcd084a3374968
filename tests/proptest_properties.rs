//! Property-based tests for forward, backward and gradient application.

use libsoundchange::default_changer;
use libsoundchange::prelude::*;
use proptest::prelude::*;

const GRAPHEMES: &[&str] = &["p", "t", "k", "b", "d", "g", "m", "n", "s", "l", "a", "e", "i", "o", "u"];

// Words of 1..8 sounds wrapped in boundaries
fn word_strategy() -> impl Strategy<Value = Sequence> {
    prop::collection::vec(prop::sample::select(GRAPHEMES), 1..8).prop_map(|graphemes| {
        parse_sequence(&format!("# {} #", graphemes.join(" "))).unwrap()
    })
}

// Rules whose input side is recoverable from their output
fn rule_strategy() -> impl Strategy<Value = Rule> {
    prop::sample::select(vec![
        "p > b",
        "n > m / _ p",
        "C > @2[+voiced] / V _ V",
        "{p|t|k} > {b|d|g}",
        "s > :null: / _ #",
        "a > e / _ i",
        ":null: > e / # _ s",
        "a > e / _ C? #",
        "a > e / _ p|t",
        "a > e / _ !V",
        "a > e / _ :coda:",
    ])
    .prop_map(|source| parse_rule(source).unwrap())
}

// Adds rules that delete a class, reconstructed only as the class
fn any_rule_strategy() -> impl Strategy<Value = Rule> {
    prop_oneof![
        rule_strategy(),
        Just(parse_rule("C+ > :null: / _ #").unwrap()),
        Just(parse_rule("a C? > e").unwrap()),
    ]
}

fn substitution_strategy() -> impl Strategy<Value = Rule> {
    prop::sample::select(vec!["p > b", "n > m / _ p", "{p|t|k} > {b|d|g}", "C > @2[+voiced] / V _ V"])
        .prop_map(|source| parse_rule(source).unwrap())
}

proptest! {
    #[test]
    fn prop_round_trip_contains_original(word in word_strategy(), rule in rule_strategy()) {
        let changed = forward(&word, &rule).unwrap();
        let candidates = backward(&changed, &rule).unwrap();
        prop_assert!(
            candidates.contains(&word),
            "{} -> {} under '{}' not recovered from {:?}",
            word, changed, rule, candidates.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
    }

    #[test]
    fn prop_candidates_have_no_internal_boundaries(word in word_strategy(), rule in any_rule_strategy()) {
        for candidate in backward(&word, &rule).unwrap() {
            prop_assert!(!candidate.has_internal_boundary(), "{}", candidate);
        }
    }

    #[test]
    fn prop_substitution_preserves_length(word in word_strategy(), rule in substitution_strategy()) {
        prop_assert_eq!(forward(&word, &rule).unwrap().len(), word.len());
    }

    #[test]
    fn prop_forward_is_deterministic(word in word_strategy(), rule in any_rule_strategy()) {
        prop_assert_eq!(forward(&word, &rule).unwrap(), forward(&word, &rule).unwrap());
    }

    #[test]
    fn prop_no_match_passes_through(word in word_strategy()) {
        // x never occurs in generated words
        let rule = parse_rule("x > h").unwrap();
        prop_assert_eq!(forward(&word, &rule).unwrap(), word);
    }

    #[test]
    fn prop_seeded_gradient_is_deterministic(
        word in word_strategy(),
        strength in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let first = apply_gradient(&word, "p > b", strength, Some(seed)).unwrap();
        let second = apply_gradient(&word, "p > b", strength, Some(seed)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_gradient_extremes(word in word_strategy(), seed in any::<u64>()) {
        let rule = parse_rule("{p|t|k} > {b|d|g}").unwrap();
        let changer = default_changer();
        prop_assert_eq!(changer.apply_gradient_rule(&word, &rule, 0.0, Some(seed)).unwrap(), word.clone());
        prop_assert_eq!(
            changer.apply_gradient_rule(&word, &rule, 1.0, Some(seed)).unwrap(),
            forward(&word, &rule).unwrap()
        );
    }
}
