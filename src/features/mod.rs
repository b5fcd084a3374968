//! Feature system: grapheme ↔ feature mapping and feature arithmetic.
//!
//! The matching engine only needs three operations from a feature system:
//!
//! - [`FeatureSystem::partial_match`] - subsumption test for sound classes
//! - [`FeatureSystem::apply_modifiers`] - pure feature arithmetic for
//!   backreference modifiers (`@1[+voiced]`)
//! - [`FeatureSystem::features_to_grapheme`] - display form of a modified sound
//!
//! The parser additionally resolves graphemes, sound classes and feature
//! names through the same trait. [`IpaFeatures`] is the shipped
//! implementation.
//!
//! # Feature arithmetic
//!
//! Features are organised in groups of mutually exclusive values
//! ([`FEATURE_GROUPS`]). Applying `+f` (or bare `f`) inserts `f` and removes
//! the other members of its group; `-f` removes `f` and, when the group is
//! binary, inserts the opposite value:
//!
//! ```rust,ignore
//! // p = {consonant, voiceless, bilabial, plosive}
//! // p + [+voiced] = {consonant, voiced, bilabial, plosive} = b
//! // b + [-voiced] = {consonant, voiceless, bilabial, plosive} = p
//! ```

mod ipa;

pub use ipa::IpaFeatures;

use crate::model::{Element, FeatureSet, Modifier, Sound, Token};

/// Groups of mutually exclusive feature values.
///
/// Single-member groups are privative: the feature is either present or
/// absent.
pub const FEATURE_GROUPS: &[&[&str]] = &[
    &["consonant", "vowel"],
    &["voiced", "voiceless"],
    &[
        "bilabial",
        "labiodental",
        "dental",
        "alveolar",
        "postalveolar",
        "retroflex",
        "palatal",
        "velar",
        "uvular",
        "glottal",
    ],
    &[
        "plosive",
        "fricative",
        "affricate",
        "nasal",
        "approximant",
        "lateral",
        "trill",
        "tap",
    ],
    &["close", "near-close", "close-mid", "mid", "open-mid", "open"],
    &["front", "central", "back"],
    &["rounded", "unrounded"],
    &["long"],
    &["aspirated"],
    &["nasalized"],
];

/// Group containing `feature`, if it is a known feature.
pub fn feature_group(feature: &str) -> Option<&'static [&'static str]> {
    FEATURE_GROUPS
        .iter()
        .copied()
        .find(|group| group.contains(&feature))
}

/// Apply a modifier using the group rules of [`FEATURE_GROUPS`].
///
/// Unknown features are treated as privative.
pub fn apply_grouped(features: &FeatureSet, modifier: &Modifier) -> FeatureSet {
    let mut result = features.clone();
    for change in modifier.changes() {
        let group = feature_group(&change.feature);
        if change.is_positive() {
            if let Some(group) = group {
                for member in group.iter().filter(|m| **m != change.feature) {
                    result.remove(*member);
                }
            }
            result.insert(change.feature.clone());
        } else {
            result.remove(&change.feature);
            if let Some([a, b]) = group {
                let opposite = if *a == change.feature { b } else { a };
                result.insert((*opposite).to_string());
            }
        }
    }
    result
}

/// Grapheme ↔ feature mapping and feature arithmetic.
///
/// Implementations must be pure: the same inputs always give the same
/// outputs, and inputs are never mutated.
pub trait FeatureSystem {
    /// Feature set of a concrete grapheme, or `None` if it is unknown.
    fn grapheme_to_features(&self, grapheme: &str) -> Option<FeatureSet>;

    /// Display form for a feature set (nearest known sound when the set has
    /// no exact entry).
    fn features_to_grapheme(&self, features: &FeatureSet) -> String;

    /// Feature set of a named sound class such as `V` or `C`.
    fn sound_class(&self, name: &str) -> Option<FeatureSet>;

    /// Returns true if `name` is a feature this system understands.
    fn is_feature(&self, name: &str) -> bool;

    /// Feature arithmetic: returns a new set, never mutates `features`.
    fn apply_modifiers(&self, features: &FeatureSet, modifier: &Modifier) -> FeatureSet {
        apply_grouped(features, modifier)
    }

    /// Subsumption: every positive pattern feature is present in the
    /// element and no `-f` pattern feature is.
    fn partial_match(&self, pattern: &FeatureSet, element: &FeatureSet) -> bool {
        pattern.iter().all(|feature| match feature.strip_prefix('-') {
            Some(negated) => !element.contains(negated),
            None => element.contains(feature),
        })
    }

    /// Known graphemes close to an unknown one, for error messages.
    fn suggestions(&self, _unknown: &str) -> Vec<String> {
        Vec::new()
    }

    /// Build a concrete sound from a grapheme.
    fn sound(&self, grapheme: &str) -> Option<Sound> {
        self.grapheme_to_features(grapheme)
            .map(|features| Sound::new(grapheme, features))
    }

    /// Apply a modifier to a sound, producing a new sound.
    ///
    /// Concrete sounds get a re-derived grapheme; classes keep their name
    /// with the modifier appended (`C[+voiced]`). A concrete sound whose new
    /// features have no grapheme of their own is named the same way
    /// (`ʔ[+voiced]`), so it never prints as a different sound.
    fn modify_sound(&self, sound: &Sound, modifier: &Modifier) -> Sound {
        let features = self.apply_modifiers(&sound.features, modifier);
        let annotated = || format!("{}[{}]", sound.grapheme, modifier);
        if sound.partial {
            return Sound {
                grapheme: annotated(),
                features,
                partial: true,
            };
        }

        let derived = self.features_to_grapheme(&features);
        let grapheme = if self.grapheme_to_features(&derived).as_ref() == Some(&features) {
            derived
        } else {
            annotated()
        };
        Sound {
            grapheme,
            features,
            partial: false,
        }
    }

    /// Apply a modifier to an element; boundaries are returned unchanged.
    fn modify_element(&self, element: &Element, modifier: &Modifier) -> Element {
        match element {
            Element::Sound(sound) => Element::Sound(self.modify_sound(sound, modifier)),
            Element::Boundary => Element::Boundary,
        }
    }

    /// Apply a modifier to every sound a pattern token describes.
    ///
    /// Sets and choices receive the modifier on each alternative.
    fn modify_token(&self, token: &Token, modifier: &Modifier) -> Token {
        match token {
            Token::Segment(sound) => Token::Segment(self.modify_sound(sound, modifier)),
            Token::Choice(alternatives) => Token::Choice(
                alternatives
                    .iter()
                    .map(|alt| self.modify_token(alt, modifier))
                    .collect(),
            ),
            Token::Set(alternatives) => Token::Set(
                alternatives
                    .iter()
                    .map(|alt| self.modify_token(alt, modifier))
                    .collect(),
            ),
            Token::Quantified { inner, quantifier } => Token::Quantified {
                inner: Box::new(self.modify_token(inner, modifier)),
                quantifier: *quantifier,
            },
            Token::Boundary
            | Token::BackRef { .. }
            | Token::Empty
            | Token::Focus
            | Token::SyllableCond(_)
            | Token::Negation(_) => token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(features: &[&str]) -> FeatureSet {
        features.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_feature_group_lookup() {
        assert_eq!(feature_group("voiced"), Some(&["voiced", "voiceless"][..]));
        assert_eq!(feature_group("long"), Some(&["long"][..]));
        assert_eq!(feature_group("sparkly"), None);
    }

    #[test]
    fn test_apply_plus_replaces_group_member() {
        let p = set(&["consonant", "voiceless", "bilabial", "plosive"]);
        let modified = apply_grouped(&p, &Modifier::parse("+voiced").unwrap());
        assert_eq!(modified, set(&["consonant", "voiced", "bilabial", "plosive"]));
        // input untouched
        assert!(p.contains("voiceless"));
    }

    #[test]
    fn test_apply_minus_binary_inserts_opposite() {
        let b = set(&["consonant", "voiced", "bilabial", "plosive"]);
        let modified = apply_grouped(&b, &Modifier::parse("-voiced").unwrap());
        assert_eq!(modified, set(&["consonant", "voiceless", "bilabial", "plosive"]));
    }

    #[test]
    fn test_apply_minus_privative_only_removes() {
        let long_a = set(&["vowel", "open", "front", "unrounded", "long"]);
        let modified = apply_grouped(&long_a, &Modifier::parse("-long").unwrap());
        assert_eq!(modified, set(&["vowel", "open", "front", "unrounded"]));
    }

    #[test]
    fn test_apply_place_change() {
        let n = set(&["consonant", "voiced", "alveolar", "nasal"]);
        let modified = apply_grouped(&n, &Modifier::parse("bilabial").unwrap());
        assert_eq!(modified, set(&["consonant", "voiced", "bilabial", "nasal"]));
    }

    #[test]
    fn test_partial_match_subsumption_and_negation() {
        let system = IpaFeatures::new();
        let b = set(&["consonant", "voiced", "bilabial", "plosive"]);
        assert!(system.partial_match(&set(&["consonant"]), &b));
        assert!(system.partial_match(&set(&["consonant", "voiced"]), &b));
        assert!(!system.partial_match(&set(&["vowel"]), &b));
        assert!(system.partial_match(&set(&["consonant", "-nasal"]), &b));
        assert!(!system.partial_match(&set(&["-voiced"]), &b));
        assert!(system.partial_match(&FeatureSet::new(), &b));
    }

    #[test]
    fn test_modify_partial_sound_keeps_class_name() {
        let system = IpaFeatures::new();
        let class = Sound::partial("C", ["consonant"]);
        let modified = system.modify_sound(&class, &Modifier::parse("+voiced").unwrap());
        assert!(modified.partial);
        assert_eq!(modified.grapheme, "C[+voiced]");
        assert_eq!(modified.features, set(&["consonant", "voiced"]));
    }

    #[test]
    fn test_modify_sound_without_grapheme_keeps_source_name() {
        let system = IpaFeatures::new();
        let glottal = system.sound("ʔ").unwrap();
        let modified = system.modify_sound(&glottal, &Modifier::parse("+voiced").unwrap());
        assert!(!modified.partial);
        assert_eq!(modified.grapheme, "ʔ[+voiced]");
        assert!(modified.has_feature("glottal"));
        assert!(modified.has_feature("voiced"));
        assert!(!modified.same_sound(&system.sound("b").unwrap()));
    }

    #[test]
    fn test_modify_token_distributes_over_set() {
        let system = IpaFeatures::new();
        let token = Token::Set(vec![
            Token::Segment(system.sound("p").unwrap()),
            Token::Segment(system.sound("t").unwrap()),
        ]);
        let modified = system.modify_token(&token, &Modifier::parse("+voiced").unwrap());
        assert_eq!(modified.to_string(), "{b|d}");
    }
}
