//! Syllabification: assigning onset, nucleus and coda roles to positions.

use rustc_hash::FxHashMap;

use crate::model::{Element, Sound, SyllablePosition};

/// Syllable roles of the positions of one sequence.
///
/// Positions without a role (boundaries, consonants of vowelless words) are
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllableMap {
    roles: FxHashMap<usize, SyllablePosition>,
}

impl SyllableMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a role to a position.
    pub fn assign(&mut self, position: usize, role: SyllablePosition) {
        self.roles.insert(position, role);
    }

    /// Role of a position, if any.
    #[inline]
    pub fn role(&self, position: usize) -> Option<SyllablePosition> {
        self.roles.get(&position).copied()
    }

    /// Number of positions with a role.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true if no position has a role.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Assigns syllable roles to the positions of a sequence.
pub trait Syllabifier {
    /// Compute the roles for every position of `sequence`.
    fn build_syllable_map(&self, sequence: &[Element]) -> SyllableMap;
}

/// Sonority-based syllabifier.
///
/// Vowels are nuclei. Consonants before the first nucleus of a word are
/// onsets and consonants after the last nucleus are codas. A cluster between
/// two nuclei gives its last consonant to the following onset and extends
/// that onset leftwards while sonority keeps rising towards the nucleus
/// (maximal onset); the rest closes the preceding syllable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SonoritySyllabifier;

impl SonoritySyllabifier {
    /// Sonority rank: stops lowest, vowels highest.
    pub fn sonority(sound: &Sound) -> u8 {
        const RANKS: &[(&str, u8)] = &[
            ("vowel", 6),
            ("approximant", 5),
            ("lateral", 4),
            ("trill", 4),
            ("tap", 4),
            ("nasal", 3),
            ("fricative", 2),
            ("affricate", 1),
            ("plosive", 1),
        ];
        RANKS
            .iter()
            .find(|(feature, _)| sound.has_feature(feature))
            .map_or(1, |&(_, rank)| rank)
    }

    fn syllabify_word(&self, word: &[(usize, &Sound)], map: &mut SyllableMap) {
        let nuclei: Vec<usize> = word
            .iter()
            .enumerate()
            .filter(|(_, (_, sound))| sound.has_feature("vowel"))
            .map(|(i, _)| i)
            .collect();

        let (Some(&first), Some(&last)) = (nuclei.first(), nuclei.last()) else {
            return;
        };

        for &(position, _) in &word[..first] {
            map.assign(position, SyllablePosition::Onset);
        }
        for &i in &nuclei {
            map.assign(word[i].0, SyllablePosition::Nucleus);
        }
        for &(position, _) in &word[last + 1..] {
            map.assign(position, SyllablePosition::Coda);
        }

        for pair in nuclei.windows(2) {
            let cluster = &word[pair[0] + 1..pair[1]];
            if cluster.is_empty() {
                continue;
            }
            // index into `cluster` where the onset of the next syllable starts
            let mut onset_start = cluster.len() - 1;
            while onset_start > 0
                && Self::sonority(cluster[onset_start - 1].1) < Self::sonority(cluster[onset_start].1)
            {
                onset_start -= 1;
            }
            for (k, &(position, _)) in cluster.iter().enumerate() {
                let role = if k < onset_start {
                    SyllablePosition::Coda
                } else {
                    SyllablePosition::Onset
                };
                map.assign(position, role);
            }
        }
    }
}

impl Syllabifier for SonoritySyllabifier {
    fn build_syllable_map(&self, sequence: &[Element]) -> SyllableMap {
        let mut map = SyllableMap::new();
        let mut word: Vec<(usize, &Sound)> = Vec::new();
        for (position, element) in sequence.iter().enumerate() {
            match element {
                Element::Sound(sound) => word.push((position, sound)),
                Element::Boundary => {
                    self.syllabify_word(&word, &mut map);
                    word.clear();
                }
            }
        }
        self.syllabify_word(&word, &mut map);
        map
    }
}
