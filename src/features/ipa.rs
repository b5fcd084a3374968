//! IPA feature table.

use rustc_hash::{FxHashMap, FxHashSet};

use super::{FeatureSystem, FEATURE_GROUPS};
use crate::model::FeatureSet;

/// Diacritics recognised after a base grapheme, with the feature they add.
///
/// Order here is the order they are re-appended by
/// [`IpaFeatures::features_to_grapheme`].
const DIACRITICS: &[(char, &str)] = &[('\u{303}', "nasalized"), ('ʰ', "aspirated"), ('ː', "long")];

const CONSONANTS: &[(&str, &str, &str, &str)] = &[
    // grapheme, voicing, place, manner
    ("p", "voiceless", "bilabial", "plosive"),
    ("b", "voiced", "bilabial", "plosive"),
    ("t", "voiceless", "alveolar", "plosive"),
    ("d", "voiced", "alveolar", "plosive"),
    ("ʈ", "voiceless", "retroflex", "plosive"),
    ("ɖ", "voiced", "retroflex", "plosive"),
    ("c", "voiceless", "palatal", "plosive"),
    ("ɟ", "voiced", "palatal", "plosive"),
    ("k", "voiceless", "velar", "plosive"),
    ("g", "voiced", "velar", "plosive"),
    ("q", "voiceless", "uvular", "plosive"),
    ("ɢ", "voiced", "uvular", "plosive"),
    ("ʔ", "voiceless", "glottal", "plosive"),
    ("m", "voiced", "bilabial", "nasal"),
    ("m̥", "voiceless", "bilabial", "nasal"),
    ("ɱ", "voiced", "labiodental", "nasal"),
    ("n", "voiced", "alveolar", "nasal"),
    ("n̥", "voiceless", "alveolar", "nasal"),
    ("ɳ", "voiced", "retroflex", "nasal"),
    ("ɲ", "voiced", "palatal", "nasal"),
    ("ɲ̊", "voiceless", "palatal", "nasal"),
    ("ŋ", "voiced", "velar", "nasal"),
    ("ŋ̊", "voiceless", "velar", "nasal"),
    ("ɴ", "voiced", "uvular", "nasal"),
    ("ɸ", "voiceless", "bilabial", "fricative"),
    ("β", "voiced", "bilabial", "fricative"),
    ("f", "voiceless", "labiodental", "fricative"),
    ("v", "voiced", "labiodental", "fricative"),
    ("θ", "voiceless", "dental", "fricative"),
    ("ð", "voiced", "dental", "fricative"),
    ("s", "voiceless", "alveolar", "fricative"),
    ("z", "voiced", "alveolar", "fricative"),
    ("ʃ", "voiceless", "postalveolar", "fricative"),
    ("ʒ", "voiced", "postalveolar", "fricative"),
    ("ʂ", "voiceless", "retroflex", "fricative"),
    ("ʐ", "voiced", "retroflex", "fricative"),
    ("ç", "voiceless", "palatal", "fricative"),
    ("ʝ", "voiced", "palatal", "fricative"),
    ("x", "voiceless", "velar", "fricative"),
    ("ɣ", "voiced", "velar", "fricative"),
    ("χ", "voiceless", "uvular", "fricative"),
    ("ʁ", "voiced", "uvular", "fricative"),
    ("h", "voiceless", "glottal", "fricative"),
    ("ɦ", "voiced", "glottal", "fricative"),
    ("ts", "voiceless", "alveolar", "affricate"),
    ("dz", "voiced", "alveolar", "affricate"),
    ("tʃ", "voiceless", "postalveolar", "affricate"),
    ("dʒ", "voiced", "postalveolar", "affricate"),
    ("r", "voiced", "alveolar", "trill"),
    ("r̥", "voiceless", "alveolar", "trill"),
    ("ɾ", "voiced", "alveolar", "tap"),
    ("ɾ̥", "voiceless", "alveolar", "tap"),
    ("l", "voiced", "alveolar", "lateral"),
    ("ɬ", "voiceless", "alveolar", "lateral"),
    ("ʎ", "voiced", "palatal", "lateral"),
    ("ʋ", "voiced", "labiodental", "approximant"),
    ("ɹ", "voiced", "alveolar", "approximant"),
    ("ɹ̥", "voiceless", "alveolar", "approximant"),
    ("j", "voiced", "palatal", "approximant"),
    ("j̊", "voiceless", "palatal", "approximant"),
    ("w", "voiced", "velar", "approximant"),
    ("ʍ", "voiceless", "velar", "approximant"),
];

const VOWELS: &[(&str, &str, &str, &str)] = &[
    // grapheme, height, backness, rounding
    ("i", "close", "front", "unrounded"),
    ("y", "close", "front", "rounded"),
    ("ɨ", "close", "central", "unrounded"),
    ("ʉ", "close", "central", "rounded"),
    ("ɯ", "close", "back", "unrounded"),
    ("u", "close", "back", "rounded"),
    ("ɪ", "near-close", "front", "unrounded"),
    ("ʊ", "near-close", "back", "rounded"),
    ("e", "close-mid", "front", "unrounded"),
    ("ø", "close-mid", "front", "rounded"),
    ("ɘ", "close-mid", "central", "unrounded"),
    ("ɤ", "close-mid", "back", "unrounded"),
    ("o", "close-mid", "back", "rounded"),
    ("ə", "mid", "central", "unrounded"),
    ("ɛ", "open-mid", "front", "unrounded"),
    ("œ", "open-mid", "front", "rounded"),
    ("ʌ", "open-mid", "back", "unrounded"),
    ("ɔ", "open-mid", "back", "rounded"),
    ("a", "open", "front", "unrounded"),
    ("ɶ", "open", "front", "rounded"),
    ("ɑ", "open", "back", "unrounded"),
    ("ɒ", "open", "back", "rounded"),
];

const CLASSES: &[(&str, &[&str])] = &[
    ("V", &["vowel"]),
    ("C", &["consonant"]),
    ("N", &["consonant", "nasal"]),
    ("S", &["consonant", "plosive"]),
    ("F", &["consonant", "fricative"]),
    ("L", &["consonant", "lateral"]),
];

/// Feature system backed by a table of IPA consonants and vowels.
///
/// Graphemes may carry the diacritics `ː` (long), `ʰ` (aspirated) and a
/// combining tilde (nasalized). Sound classes `V`, `C`, `N` (nasals),
/// `S` (stops), `F` (fricatives) and `L` (laterals) are predefined.
///
/// # Example
///
/// ```rust,ignore
/// use libsoundchange::features::{FeatureSystem, IpaFeatures};
///
/// let ipa = IpaFeatures::new();
/// let p = ipa.grapheme_to_features("p").unwrap();
/// assert!(p.contains("voiceless"));
/// assert_eq!(ipa.features_to_grapheme(&p), "p");
/// ```
#[derive(Debug, Clone)]
pub struct IpaFeatures {
    /// Table entries in declaration order
    sounds: Vec<(String, FeatureSet)>,
    by_grapheme: FxHashMap<String, usize>,
    by_features: FxHashMap<FeatureSet, usize>,
    classes: FxHashMap<String, FeatureSet>,
    known_features: FxHashSet<&'static str>,
}

impl IpaFeatures {
    /// Build the table.
    pub fn new() -> Self {
        let consonants = CONSONANTS.iter().map(|&(g, voicing, place, manner)| {
            (g, ["consonant", voicing, place, manner])
        });
        let vowels = VOWELS
            .iter()
            .map(|&(g, height, backness, rounding)| (g, ["vowel", height, backness, rounding]));

        let sounds: Vec<(String, FeatureSet)> = consonants
            .chain(vowels)
            .map(|(g, features)| {
                (
                    g.to_string(),
                    features.iter().map(|f| f.to_string()).collect(),
                )
            })
            .collect();

        let mut by_grapheme = FxHashMap::default();
        let mut by_features = FxHashMap::default();
        for (i, (grapheme, features)) in sounds.iter().enumerate() {
            by_grapheme.insert(grapheme.clone(), i);
            by_features.entry(features.clone()).or_insert(i);
        }

        let classes = CLASSES
            .iter()
            .map(|(name, features)| {
                (
                    name.to_string(),
                    features.iter().map(|f| f.to_string()).collect(),
                )
            })
            .collect();

        let known_features = FEATURE_GROUPS.iter().flat_map(|g| g.iter().copied()).collect();

        Self {
            sounds,
            by_grapheme,
            by_features,
            classes,
            known_features,
        }
    }

    /// Number of base sounds in the table.
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    /// Returns true if the table has no sounds.
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Base graphemes in table order.
    pub fn graphemes(&self) -> impl Iterator<Item = &str> {
        self.sounds.iter().map(|(g, _)| g.as_str())
    }

    /// Table entry closest to `features`: most shared features, fewest
    /// extra ones, earliest on ties.
    fn nearest(&self, features: &FeatureSet) -> Option<&str> {
        let mut best: Option<(isize, usize)> = None;
        for (i, (_, entry)) in self.sounds.iter().enumerate() {
            let shared = entry.intersection(features).count() as isize;
            let extra = entry.difference(features).count() as isize;
            let score = 2 * shared - extra;
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, i));
            }
        }
        best.map(|(_, i)| self.sounds[i].0.as_str())
    }
}

impl Default for IpaFeatures {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSystem for IpaFeatures {
    fn grapheme_to_features(&self, grapheme: &str) -> Option<FeatureSet> {
        if let Some(&i) = self.by_grapheme.get(grapheme) {
            return Some(self.sounds[i].1.clone());
        }

        // Peel diacritics off the end until a base grapheme is found
        let mut base = grapheme;
        let mut added = Vec::new();
        while let Some(last) = base.chars().last() {
            let Some(&(_, feature)) = DIACRITICS.iter().find(|(mark, _)| *mark == last) else {
                break;
            };
            added.push(feature);
            base = &base[..base.len() - last.len_utf8()];
            if let Some(&i) = self.by_grapheme.get(base) {
                let mut features = self.sounds[i].1.clone();
                features.extend(added.iter().map(|f| f.to_string()));
                return Some(features);
            }
        }
        None
    }

    fn features_to_grapheme(&self, features: &FeatureSet) -> String {
        let mut base = features.clone();
        for (_, feature) in DIACRITICS {
            base.remove(*feature);
        }

        let mut grapheme = match self.by_features.get(&base) {
            Some(&i) => self.sounds[i].0.clone(),
            None => self.nearest(&base).unwrap_or_default().to_string(),
        };
        for (mark, feature) in DIACRITICS {
            if features.contains(*feature) {
                grapheme.push(*mark);
            }
        }
        grapheme
    }

    fn sound_class(&self, name: &str) -> Option<FeatureSet> {
        self.classes.get(name).cloned()
    }

    fn is_feature(&self, name: &str) -> bool {
        self.known_features.contains(name)
    }

    fn suggestions(&self, unknown: &str) -> Vec<String> {
        let Some(first) = unknown.chars().next() else {
            return Vec::new();
        };
        let lowered: String = first.to_lowercase().collect();
        self.graphemes()
            .filter(|g| g.starts_with(first) || g.starts_with(lowered.as_str()))
            .take(5)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Modifier;

    #[test]
    fn test_table_graphemes_have_unique_features() {
        let ipa = IpaFeatures::new();
        let mut seen = FxHashSet::default();
        for (grapheme, features) in &ipa.sounds {
            assert!(seen.insert(features.clone()), "duplicate features for {grapheme}");
        }
        assert_eq!(ipa.len(), CONSONANTS.len() + VOWELS.len());
    }

    #[test]
    fn test_grapheme_roundtrip_for_every_entry() {
        let ipa = IpaFeatures::new();
        for grapheme in ipa.graphemes() {
            let features = ipa.grapheme_to_features(grapheme).unwrap();
            assert_eq!(ipa.features_to_grapheme(&features), grapheme);
        }
    }

    #[test]
    fn test_diacritics() {
        let ipa = IpaFeatures::new();
        let long_a = ipa.grapheme_to_features("aː").unwrap();
        assert!(long_a.contains("long"));
        assert!(long_a.contains("open"));
        assert_eq!(ipa.features_to_grapheme(&long_a), "aː");

        let aspirated = ipa.grapheme_to_features("tʰ").unwrap();
        assert!(aspirated.contains("aspirated"));

        let nasal_long = ipa.grapheme_to_features("a\u{303}ː").unwrap();
        assert!(nasal_long.contains("nasalized") && nasal_long.contains("long"));
        assert_eq!(ipa.features_to_grapheme(&nasal_long), "a\u{303}ː");
    }

    #[test]
    fn test_unknown_grapheme() {
        let ipa = IpaFeatures::new();
        assert_eq!(ipa.grapheme_to_features("Q"), None);
        assert_eq!(ipa.grapheme_to_features("ː"), None);
        assert_eq!(ipa.grapheme_to_features(""), None);
    }

    #[test]
    fn test_voicing_flip_rederives_grapheme() {
        let ipa = IpaFeatures::new();
        let voice = Modifier::parse("+voiced").unwrap();
        for (voiceless, voiced) in [("p", "b"), ("t", "d"), ("k", "g"), ("s", "z"), ("f", "v")] {
            let sound = ipa.sound(voiceless).unwrap();
            assert_eq!(ipa.modify_sound(&sound, &voice).grapheme, voiced);
        }
    }

    #[test]
    fn test_nearest_for_missing_entry() {
        let ipa = IpaFeatures::new();
        // voiced glottal stop has no table entry
        let features: FeatureSet = ["consonant", "voiced", "glottal", "plosive"]
            .iter()
            .map(|f| f.to_string())
            .collect();
        let grapheme = ipa.features_to_grapheme(&features);
        assert!(!grapheme.is_empty());
        assert!(ipa.grapheme_to_features(&grapheme).is_some());
    }

    #[test]
    fn test_classes_and_features() {
        let ipa = IpaFeatures::new();
        assert!(ipa.sound_class("V").unwrap().contains("vowel"));
        assert!(ipa.sound_class("X").is_none());
        assert!(ipa.is_feature("voiced"));
        assert!(ipa.is_feature("close-mid"));
        assert!(!ipa.is_feature("sparkly"));
    }

    #[test]
    fn test_suggestions() {
        let ipa = IpaFeatures::new();
        let suggestions = ipa.suggestions("tx");
        assert!(suggestions.contains(&"t".to_string()));
        assert!(suggestions.contains(&"ts".to_string()));
        assert!(ipa.suggestions("").is_empty());
    }
}
