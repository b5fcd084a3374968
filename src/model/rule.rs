//! The sound change rule value.

use std::fmt;

use super::token::Token;

/// A sound change rule: an ante pattern rewritten into a post pattern.
///
/// Contexts are folded in by the parser, so `n > m / _ p` is stored as
/// ante `n p` and post `m @2`.
///
/// # Fields
///
/// - `source` - Rule text the rule was built from
/// - `ante` - Input-side pattern
/// - `post` - Output-side pattern; may contain backreferences into `ante`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// Rule text
    pub source: String,
    /// Input-side pattern
    pub ante: Vec<Token>,
    /// Output-side pattern
    pub post: Vec<Token>,
}

impl Rule {
    /// Create a rule from already-built token lists.
    pub fn new(source: impl Into<String>, ante: Vec<Token>, post: Vec<Token>) -> Self {
        Self {
            source: source.into(),
            ante,
            post,
        }
    }

    /// Returns true if the ante needs variable-length matching.
    pub fn has_quantifier(&self) -> bool {
        self.ante.iter().any(Token::is_quantified)
    }

    /// Returns true if matching the ante needs a syllable map.
    pub fn is_syllable_conditioned(&self) -> bool {
        self.ante.iter().any(Token::uses_syllables)
    }

    /// Ante positions copied by a post-side backreference, in post order.
    pub fn referenced_ante(&self) -> impl Iterator<Item = usize> + '_ {
        self.post.iter().filter_map(|token| match token {
            Token::BackRef { index, .. } => Some(*index),
            _ => None,
        })
    }

    /// Post tokens that consume input on the output side (everything but
    /// `Empty`).
    pub fn post_without_empties(&self) -> impl Iterator<Item = &Token> + '_ {
        self.post.iter().filter(|token| !token.is_empty_marker())
    }

    /// First backreference index that points past the end of the ante.
    pub fn dangling_backref(&self) -> Option<usize> {
        self.referenced_ante().find(|&index| index >= self.ante.len())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Quantifier, Sound, SyllablePosition};

    fn seg(g: &str) -> Token {
        Token::Segment(Sound::new(g, ["consonant"]))
    }

    #[test]
    fn test_referenced_ante_in_post_order() {
        let rule = Rule::new(
            "x",
            vec![seg("a"), seg("p"), seg("a")],
            vec![
                Token::BackRef { index: 2, modifier: None },
                seg("b"),
                Token::BackRef { index: 0, modifier: None },
            ],
        );
        assert_eq!(rule.referenced_ante().collect::<Vec<_>>(), vec![2, 0]);
        assert_eq!(rule.dangling_backref(), None);
    }

    #[test]
    fn test_dangling_backref() {
        let rule = Rule::new("x", vec![seg("p")], vec![Token::BackRef { index: 3, modifier: None }]);
        assert_eq!(rule.dangling_backref(), Some(3));
    }

    #[test]
    fn test_rule_queries() {
        let rule = Rule::new(
            "C+ > :null: / _ #",
            vec![
                Token::Quantified {
                    inner: Box::new(seg("C")),
                    quantifier: Quantifier::OneOrMore,
                },
                Token::Boundary,
            ],
            vec![Token::Empty, Token::BackRef { index: 1, modifier: None }],
        );
        assert!(rule.has_quantifier());
        assert!(!rule.is_syllable_conditioned());
        assert_eq!(rule.post_without_empties().count(), 1);
        assert_eq!(rule.to_string(), "C+ > :null: / _ #");

        let syllabic = Rule::new("x", vec![Token::SyllableCond(SyllablePosition::Coda)], vec![]);
        assert!(syllabic.is_syllable_conditioned());
    }
}
