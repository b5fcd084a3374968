//! Left-to-right window scanner shared by forward, gradient and backward
//! application.
//!
//! At each cursor position the scanner tries to match a window starting
//! there. Patterns without quantifiers use a single window of the pattern's
//! length; quantified patterns try every admissible length from longest to
//! shortest and take the first that matches. A match advances the cursor
//! past the window, otherwise one element is passed through unchanged.

use crate::features::FeatureSystem;
use crate::model::{Element, Token};

use super::matching::{length_bounds, match_pattern, MatchContext, MatchResult};

/// One step of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStep<'a> {
    /// No match at this position; the element passes through
    Copy(&'a Element),
    /// The window starting at `start` matched
    Match {
        /// Absolute position of the window
        start: usize,
        /// Matched elements
        window: &'a [Element],
        /// Bindings of the match
        result: MatchResult,
    },
}

/// Iterator over the [`ScanStep`]s of one sequence.
pub struct WindowScanner<'a, F: FeatureSystem + ?Sized> {
    sequence: &'a [Element],
    pattern: &'a [Token],
    ctx: MatchContext<'a, F>,
    variable: bool,
    min_len: usize,
    max_len: usize,
    cursor: usize,
}

impl<'a, F: FeatureSystem + ?Sized> WindowScanner<'a, F> {
    /// Scan `sequence` for `pattern`. `quantifier_bound` caps how many
    /// elements a single `+` token may absorb.
    pub fn new(
        sequence: &'a [Element],
        pattern: &'a [Token],
        ctx: MatchContext<'a, F>,
        quantifier_bound: usize,
    ) -> Self {
        let variable = pattern.iter().any(Token::is_quantified);
        let (min_len, max_len) = length_bounds(pattern, quantifier_bound);
        Self {
            sequence,
            pattern,
            ctx,
            variable,
            min_len,
            max_len,
            cursor: 0,
        }
    }

    fn match_at(&self, start: usize) -> Option<(&'a [Element], MatchResult)> {
        let remaining = self.sequence.len() - start;
        let ctx = self.ctx.at(start);

        if !self.variable {
            let len = self.pattern.len();
            if len == 0 || len > remaining {
                return None;
            }
            let window = &self.sequence[start..start + len];
            let result = match_pattern(window, self.pattern, &ctx);
            return result.matched.then_some((window, result));
        }

        let longest = self.max_len.min(remaining);
        let shortest = self.min_len.max(1);
        (shortest..=longest).rev().find_map(|len| {
            let window = &self.sequence[start..start + len];
            let result = match_pattern(window, self.pattern, &ctx);
            result.matched.then_some((window, result))
        })
    }
}

impl<'a, F: FeatureSystem + ?Sized> Iterator for WindowScanner<'a, F> {
    type Item = ScanStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor;
        let element = self.sequence.get(start)?;

        match self.match_at(start) {
            Some((window, result)) => {
                self.cursor += window.len();
                Some(ScanStep::Match {
                    start,
                    window,
                    result,
                })
            }
            None => {
                self.cursor += 1;
                Some(ScanStep::Copy(element))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::IpaFeatures;
    use crate::model::Sequence;
    use crate::parser::{parse_rule, parse_sequence};

    fn steps(sequence: &str, rule: &str) -> Vec<String> {
        let ipa = IpaFeatures::new();
        let sequence: Sequence = parse_sequence(sequence, &ipa).unwrap();
        let rule = parse_rule(rule, &ipa).unwrap();
        WindowScanner::new(&sequence, &rule.ante, MatchContext::new(&ipa), 32)
            .map(|step| match step {
                ScanStep::Copy(element) => element.to_string(),
                ScanStep::Match { window, .. } => {
                    let parts: Vec<String> = window.iter().map(ToString::to_string).collect();
                    format!("[{}]", parts.join(" "))
                }
            })
            .collect()
    }

    #[test]
    fn test_fixed_windows() {
        assert_eq!(steps("# a n p a #", "n > m / _ p"), vec!["#", "a", "[n p]", "a", "#"]);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        assert_eq!(steps("# p p p #", "p > b / _ p"), vec!["#", "[p p]", "p", "#"]);
    }

    #[test]
    fn test_longest_window_wins() {
        assert_eq!(steps("# a s t #", "C+ > :null: / _ #"), vec!["#", "a", "[s t #]"]);
    }

    #[test]
    fn test_pattern_longer_than_sequence() {
        assert_eq!(steps("# a #", "a b c d > e"), vec!["#", "a", "#"]);
    }

    #[test]
    fn test_empty_sequence() {
        assert!(steps("", "p > b").is_empty());
    }

    #[test]
    fn test_match_start_is_absolute() {
        let ipa = IpaFeatures::new();
        let sequence = parse_sequence("# a p a #", &ipa).unwrap();
        let rule = parse_rule("p > b", &ipa).unwrap();
        let starts: Vec<usize> = WindowScanner::new(&sequence, &rule.ante, MatchContext::new(&ipa), 32)
            .filter_map(|step| match step {
                ScanStep::Match { start, .. } => Some(start),
                ScanStep::Copy(_) => None,
            })
            .collect();
        assert_eq!(starts, vec![2]);
    }
}
