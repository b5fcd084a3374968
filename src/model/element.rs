//! Sequence-side values: sounds, boundaries and sequences of them.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

/// Ordered set of feature names describing a sound.
///
/// Ordered so that equality, hashing and display are deterministic.
pub type FeatureSet = BTreeSet<String>;

/// Marker used for word and morpheme edges.
pub const BOUNDARY_MARKER: &str = "#";

/// A single sound, concrete or underspecified.
///
/// # Fields
///
/// - `grapheme` - Display form (e.g. `"p"`, `"aː"`, `"V"`)
/// - `features` - Feature description used for matching and modification
/// - `partial` - `true` for sound classes (`V`, `C`, `[voiced]`) which match
///   any sound carrying at least their features; never part of a sequence
///   being rewritten
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Sound {
    /// Display form
    pub grapheme: String,
    /// Feature description
    pub features: FeatureSet,
    /// Whether this is an underspecified sound class
    pub partial: bool,
}

impl Sound {
    /// Create a concrete sound.
    pub fn new<I, S>(grapheme: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            grapheme: grapheme.into(),
            features: features.into_iter().map(Into::into).collect(),
            partial: false,
        }
    }

    /// Create an underspecified sound class.
    pub fn partial<I, S>(grapheme: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            partial: true,
            ..Self::new(grapheme, features)
        }
    }

    /// Exact identity test used for non-partial pattern segments.
    ///
    /// Compares grapheme and feature set, ignoring the `partial` flag.
    #[inline]
    pub fn same_sound(&self, other: &Sound) -> bool {
        self.grapheme == other.grapheme && self.features == other.features
    }

    /// Check whether the sound carries a feature.
    #[inline]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.grapheme)
    }
}

/// Atomic item of a [`Sequence`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    /// A sound
    Sound(Sound),
    /// A word or morpheme edge (`#`)
    Boundary,
}

impl Element {
    /// Returns true for [`Element::Boundary`].
    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Element::Boundary)
    }

    /// The sound, if this element is one.
    #[inline]
    pub fn as_sound(&self) -> Option<&Sound> {
        match self {
            Element::Sound(sound) => Some(sound),
            Element::Boundary => None,
        }
    }

    /// Returns true for underspecified sounds.
    #[inline]
    pub fn is_partial(&self) -> bool {
        matches!(self, Element::Sound(sound) if sound.partial)
    }
}

impl From<Sound> for Element {
    fn from(sound: Sound) -> Self {
        Element::Sound(sound)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Sound(sound) => fmt::Display::fmt(sound, f),
            Element::Boundary => f.write_str(BOUNDARY_MARKER),
        }
    }
}

/// Ordered list of elements, the unit every rule operation consumes and
/// produces.
///
/// Displayed space-separated, e.g. `# a n p a #`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Sequence(Vec<Element>);

impl Sequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Borrow the elements.
    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.0
    }

    /// Take ownership of the elements.
    pub fn into_elements(self) -> Vec<Element> {
        self.0
    }

    /// Position of the first underspecified sound, if any.
    pub fn first_partial(&self) -> Option<usize> {
        self.0.iter().position(Element::is_partial)
    }

    /// A sequence is well-formed when it contains no underspecified sounds.
    pub fn is_well_formed(&self) -> bool {
        self.first_partial().is_none()
    }

    /// Returns true if a boundary occurs anywhere but the first or last slot.
    pub fn has_internal_boundary(&self) -> bool {
        let len = self.0.len();
        self.0
            .iter()
            .enumerate()
            .any(|(i, e)| e.is_boundary() && i != 0 && i + 1 != len)
    }

    /// Copy of the sequence with a boundary added at each edge that lacks one.
    pub fn wrapped(&self) -> Sequence {
        let mut elements = Vec::with_capacity(self.0.len() + 2);
        if !self.0.first().is_some_and(Element::is_boundary) {
            elements.push(Element::Boundary);
        }
        elements.extend(self.0.iter().cloned());
        if elements.len() < 2 || !elements.last().is_some_and(Element::is_boundary) {
            elements.push(Element::Boundary);
        }
        Sequence(elements)
    }
}

impl Deref for Sequence {
    type Target = [Element];

    fn deref(&self) -> &[Element] {
        &self.0
    }
}

impl From<Vec<Element>> for Sequence {
    fn from(elements: Vec<Element>) -> Self {
        Sequence(elements)
    }
}

impl FromIterator<Element> for Sequence {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        Sequence(iter.into_iter().collect())
    }
}

impl IntoIterator for Sequence {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            fmt::Display::fmt(element, f)?;
        }
        Ok(())
    }
}
