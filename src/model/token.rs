//! Pattern-side values: tokens, quantifiers and feature modifiers.

use std::fmt;

use super::element::{Sound, BOUNDARY_MARKER};

/// Repetition operator applied to a [`Token::Quantified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantifier {
    /// `+`: one or more occurrences, matched greedily
    OneOrMore,
    /// `?`: zero or one occurrence, zero tried first
    Optional,
}

impl Quantifier {
    /// The operator as written in rule text.
    pub fn symbol(self) -> char {
        match self {
            Quantifier::OneOrMore => '+',
            Quantifier::Optional => '?',
        }
    }
}

/// Role of a sequence position inside its syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SyllablePosition {
    /// Consonants before the nucleus
    Onset,
    /// The syllable peak (a vowel)
    Nucleus,
    /// Consonants after the nucleus
    Coda,
}

impl SyllablePosition {
    /// Lowercase name as used in rule text (`:onset:` etc.).
    pub fn name(self) -> &'static str {
        match self {
            SyllablePosition::Onset => "onset",
            SyllablePosition::Nucleus => "nucleus",
            SyllablePosition::Coda => "coda",
        }
    }

    /// Inverse of [`SyllablePosition::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "onset" => Some(SyllablePosition::Onset),
            "nucleus" => Some(SyllablePosition::Nucleus),
            "coda" => Some(SyllablePosition::Coda),
            _ => None,
        }
    }
}

impl fmt::Display for SyllablePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sign written in front of a feature name in a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Polarity {
    /// `+voiced`
    Plus,
    /// `-voiced`
    Minus,
    /// `voiced` (treated as `+` when applied)
    Bare,
}

/// One signed feature of a [`Modifier`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureChange {
    /// Sign of the change
    pub polarity: Polarity,
    /// Feature name
    pub feature: String,
}

impl FeatureChange {
    /// Parse a single `+f`, `-f` or `f` item.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (polarity, feature) = if let Some(rest) = text.strip_prefix('+') {
            (Polarity::Plus, rest)
        } else if let Some(rest) = text.strip_prefix('-') {
            (Polarity::Minus, rest)
        } else {
            (Polarity::Bare, text)
        };
        if feature.is_empty() || !feature.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return None;
        }
        Some(Self {
            polarity,
            feature: feature.to_string(),
        })
    }

    /// The change that undoes this one.
    pub fn inverse(&self) -> Self {
        let polarity = match self.polarity {
            Polarity::Plus | Polarity::Bare => Polarity::Minus,
            Polarity::Minus => Polarity::Plus,
        };
        Self {
            polarity,
            feature: self.feature.clone(),
        }
    }

    /// Returns true for `+f` and bare `f`.
    #[inline]
    pub fn is_positive(&self) -> bool {
        !matches!(self.polarity, Polarity::Minus)
    }
}

impl fmt::Display for FeatureChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.polarity {
            Polarity::Plus => write!(f, "+{}", self.feature),
            Polarity::Minus => write!(f, "-{}", self.feature),
            Polarity::Bare => f.write_str(&self.feature),
        }
    }
}

/// Feature arithmetic attached to a backreference, e.g. `[+voiced,-long]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier(pub Vec<FeatureChange>);

impl Modifier {
    /// Parse a comma-separated list of changes (without the brackets).
    ///
    /// Returns the offending item on failure.
    pub fn parse(text: &str) -> Result<Self, String> {
        text.split(',')
            .map(|item| FeatureChange::parse(item).ok_or_else(|| item.trim().to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map(Modifier)
    }

    /// Modifier undoing this one: `+f` becomes `-f`, `-f` becomes `+f` and
    /// bare names become `-f`.
    pub fn inverse(&self) -> Self {
        Modifier(self.0.iter().map(FeatureChange::inverse).collect())
    }

    /// Iterate over the individual changes.
    pub fn changes(&self) -> impl Iterator<Item = &FeatureChange> {
        self.0.iter()
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, change) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            fmt::Display::fmt(change, f)?;
        }
        Ok(())
    }
}

/// A pattern element of a rule's ante or post side.
///
/// Matching and translation dispatch on this enum exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// A concrete sound or a sound class
    Segment(Sound),
    /// A word edge
    Boundary,
    /// Copy of the element bound by `ante[index]`, optionally modified
    BackRef {
        /// 0-based ante position
        index: usize,
        /// Feature arithmetic applied to the copied element
        modifier: Option<Modifier>,
    },
    /// Explicit deletion or insertion marker (`:null:`)
    Empty,
    /// Any alternative may match; the alternative is not recorded
    Choice(Vec<Token>),
    /// Correspondence set; the matched alternative index is recorded
    Set(Vec<Token>),
    /// The `_` position of a rule context
    Focus,
    /// A token repeated by `+` or `?`
    Quantified {
        /// Repeated token
        inner: Box<Token>,
        /// Repetition operator
        quantifier: Quantifier,
    },
    /// Matches an element occupying a syllable role
    SyllableCond(SyllablePosition),
    /// Matches an element that `inner` does not match
    Negation(Box<Token>),
}

impl Token {
    /// Returns true if this token is a `Quantified` token.
    #[inline]
    pub fn is_quantified(&self) -> bool {
        matches!(self, Token::Quantified { .. })
    }

    /// Returns true for `Empty`.
    #[inline]
    pub fn is_empty_marker(&self) -> bool {
        matches!(self, Token::Empty)
    }

    /// Returns true if a syllable condition occurs anywhere inside the token.
    pub fn uses_syllables(&self) -> bool {
        match self {
            Token::SyllableCond(_) => true,
            Token::Choice(alternatives) | Token::Set(alternatives) => {
                alternatives.iter().any(Token::uses_syllables)
            }
            Token::Quantified { inner, .. } | Token::Negation(inner) => inner.uses_syllables(),
            Token::Segment(_)
            | Token::Boundary
            | Token::BackRef { .. }
            | Token::Empty
            | Token::Focus => false,
        }
    }

    /// Concrete element this token stands for when an ancestor form has to
    /// be written out without a matched element to copy.
    ///
    /// Choices and sets use their first alternative and quantified tokens a
    /// single occurrence; conditions that describe no element yield `None`.
    pub fn template_element(&self) -> Option<super::Element> {
        match self {
            Token::Segment(sound) => Some(super::Element::Sound(sound.clone())),
            Token::Boundary => Some(super::Element::Boundary),
            Token::Choice(alternatives) | Token::Set(alternatives) => {
                alternatives.first().and_then(Token::template_element)
            }
            Token::Quantified { inner, .. } => inner.template_element(),
            Token::BackRef { .. }
            | Token::Empty
            | Token::Focus
            | Token::SyllableCond(_)
            | Token::Negation(_) => None,
        }
    }
}

fn write_alternatives(f: &mut fmt::Formatter<'_>, alternatives: &[Token]) -> fmt::Result {
    for (i, alternative) in alternatives.iter().enumerate() {
        if i > 0 {
            f.write_str("|")?;
        }
        fmt::Display::fmt(alternative, f)?;
    }
    Ok(())
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Segment(sound) => fmt::Display::fmt(sound, f),
            Token::Boundary => f.write_str(BOUNDARY_MARKER),
            Token::BackRef { index, modifier } => {
                write!(f, "@{}", index + 1)?;
                match modifier {
                    Some(modifier) => write!(f, "[{modifier}]"),
                    None => Ok(()),
                }
            }
            Token::Empty => f.write_str(":null:"),
            Token::Choice(alternatives) => write_alternatives(f, alternatives),
            Token::Set(alternatives) => {
                f.write_str("{")?;
                write_alternatives(f, alternatives)?;
                f.write_str("}")
            }
            Token::Focus => f.write_str("_"),
            Token::Quantified { inner, quantifier } => write!(f, "{inner}{}", quantifier.symbol()),
            Token::SyllableCond(position) => write!(f, ":{position}:"),
            Token::Negation(inner) => write!(f, "!{inner}"),
        }
    }
}
