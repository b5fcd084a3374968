//! Backward reconstruction through the crate-level API.

use libsoundchange::prelude::*;

fn ancestors(word: &str, rule: &str) -> Vec<String> {
    let rule = parse_rule(rule).unwrap();
    let word = parse_sequence(word).unwrap();
    backward(&word, &rule)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn test_assimilation_round_trip() {
    let rule = parse_rule("n > m / _ p").unwrap();
    let original = parse_sequence("# a n p a #").unwrap();
    let changed = forward(&original, &rule).unwrap();
    let candidates = backward(&changed, &rule).unwrap();
    assert!(candidates.contains(&original));
    assert!(candidates.contains(&changed));
}

#[test]
fn test_set_correspondence_round_trip() {
    let rule = parse_rule("{p|b} > {f|v}").unwrap();
    for source in ["# a p a #", "# a b a #"] {
        let original = parse_sequence(source).unwrap();
        let changed = forward(&original, &rule).unwrap();
        assert!(backward(&changed, &rule).unwrap().contains(&original), "{source}");
    }
}

#[test]
fn test_voicing_round_trip() {
    let rule = parse_rule("C > @2[+voiced] / V _ V").unwrap();
    let original = parse_sequence("# a t a #").unwrap();
    let changed = forward(&original, &rule).unwrap();
    assert_eq!(changed.to_string(), "# a d a #");
    assert!(backward(&changed, &rule).unwrap().contains(&original));
}

#[test]
fn test_final_deletion_offers_the_class() {
    assert_eq!(ancestors("# a #", "C+ > :null: / _ #"), vec!["# a #", "# a C #"]);
}

#[test]
fn test_no_candidate_has_internal_boundaries() {
    for candidates in [
        ancestors("# a #", "C+ > :null: / _ #"),
        ancestors("# a b # b a #", "p > b"),
        ancestors("# e s #", ":null: > e / # _ s"),
    ] {
        for candidate in candidates {
            let inner = &candidate[1..candidate.len() - 1];
            assert!(!inner.contains('#'), "{candidate}");
        }
    }
}

#[test]
fn test_prothesis_can_be_undone() {
    assert_eq!(ancestors("# e s t a #", ":null: > e / # _ s"), vec!["# e s t a #", "# s t a #"]);
}

#[test]
fn test_literal_reading_comes_first() {
    let candidates = ancestors("# a b a #", "p > b");
    assert_eq!(candidates.first().map(String::as_str), Some("# a b a #"));
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_dedup_can_be_disabled() {
    let changer = SoundChanger::new().with_config(EngineConfig {
        dedup_candidates: false,
        ..EngineConfig::default()
    });
    // an identity rule reads every match the same way twice
    let rule = changer.parse_rule("p > p / m _").unwrap();
    let word = changer.parse_sequence("# m p #").unwrap();
    let candidates = changer.backward(&word, &rule).unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0], candidates[1]);

    let deduped = SoundChanger::new().backward(&word, &rule).unwrap();
    assert_eq!(deduped.len(), 1);
}

#[test]
fn test_partial_input_is_rejected() {
    let rule = parse_rule("p > b").unwrap();
    let word = Sequence::from(vec![
        Element::Boundary,
        Element::Sound(Sound::partial("V", ["vowel"])),
        Element::Boundary,
    ]);
    assert!(matches!(
        backward(&word, &rule),
        Err(Error::Validation { parameter: "post_sequence", .. })
    ));
}
