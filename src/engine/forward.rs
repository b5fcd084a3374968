//! Forward application: rewrite a sequence with a rule.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::Result;
use crate::features::FeatureSystem;
use crate::model::{Element, Rule, Sequence, Token};
use crate::syllable::Syllabifier;

use super::matching::{MatchContext, MatchResult};
use super::scan::{ScanStep, WindowScanner};
use super::{validate_rule, validate_sequence, SoundChanger};

impl<F: FeatureSystem, S: Syllabifier> SoundChanger<F, S> {
    /// Apply `rule` to every non-overlapping match in `sequence`, left to
    /// right.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`](crate::Error::Validation) if `sequence` holds an
    /// underspecified sound or `rule` has a backreference outside its ante.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let changer = SoundChanger::new();
    /// let rule = changer.parse_rule("p > :null:")?;
    /// let word = changer.parse_sequence("# a p a #")?;
    /// assert_eq!(changer.forward(&word, &rule)?.to_string(), "# a a #");
    /// ```
    pub fn forward(&self, sequence: &Sequence, rule: &Rule) -> Result<Sequence> {
        validate_sequence("sequence", sequence)?;
        validate_rule(rule)?;
        let output = self.rewrite(sequence, rule, |_| true);
        debug!(
            rule = %rule,
            input_len = sequence.len(),
            output_len = output.len(),
            "forward"
        );
        Ok(output)
    }

    /// Single left-to-right pass. `apply` decides, per match start, whether
    /// the match is rewritten or copied through.
    pub(crate) fn rewrite(
        &self,
        sequence: &Sequence,
        rule: &Rule,
        mut apply: impl FnMut(usize) -> bool,
    ) -> Sequence {
        if rule.ante.is_empty() || sequence.is_empty() {
            return sequence.clone();
        }

        let syllables = rule
            .is_syllable_conditioned()
            .then(|| self.syllabifier.build_syllable_map(sequence));
        let ctx = MatchContext::new(&self.features).with_syllables(syllables.as_ref());
        let scanner = WindowScanner::new(sequence, &rule.ante, ctx, self.config.quantifier_bound);

        let mut output = Vec::with_capacity(sequence.len());
        for step in scanner {
            match step {
                ScanStep::Copy(element) => output.push(element.clone()),
                ScanStep::Match {
                    start,
                    window,
                    result,
                } => {
                    if apply(start) {
                        let replacement = translate(rule, &result, &self.features);
                        trace!(start, span = window.len(), emitted = replacement.len(), "rewrite site");
                        output.extend(replacement);
                    } else {
                        output.extend_from_slice(window);
                    }
                }
            }
        }
        Sequence::from(output)
    }
}

/// Ante positions holding a correspondence set that no backreference
/// copies, in ante order. The n-th post set draws its alternative from the
/// n-th of these.
pub(crate) fn correspondence_sets(rule: &Rule) -> SmallVec<[usize; 4]> {
    let referenced: SmallVec<[usize; 4]> = rule.referenced_ante().collect();
    rule.ante
        .iter()
        .enumerate()
        .filter(|(i, token)| matches!(token, Token::Set(_)) && !referenced.contains(i))
        .map(|(i, _)| i)
        .collect()
}

/// Build the replacement for one match from the post tokens.
pub(crate) fn translate<F: FeatureSystem + ?Sized>(
    rule: &Rule,
    result: &MatchResult,
    features: &F,
) -> Vec<Element> {
    let mut set_sources = correspondence_sets(rule).into_iter();
    let mut output = Vec::with_capacity(rule.post.len());

    for token in &rule.post {
        match token {
            Token::Empty | Token::Focus => {}
            Token::Segment(sound) => output.push(Element::Sound(sound.clone())),
            Token::Boundary => output.push(Element::Boundary),
            Token::Set(alternatives) => {
                let chosen = set_sources
                    .next()
                    .and_then(|source| result.binding(source))
                    .and_then(|binding| binding.alternative())
                    .and_then(|index| alternatives.get(index));
                if let Some(element) = chosen.and_then(Token::template_element) {
                    output.push(element);
                }
            }
            Token::BackRef { index, modifier } => {
                if let Some(binding) = result.binding(*index) {
                    let element = match modifier {
                        Some(modifier) => features.modify_element(binding.element(), modifier),
                        None => binding.element().clone(),
                    };
                    output.push(element);
                }
            }
            Token::Choice(_) => {
                if let Some(element) = token.template_element() {
                    output.push(element);
                }
            }
            Token::Quantified { .. } | Token::SyllableCond(_) | Token::Negation(_) => {}
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(sequence: &str, rule: &str) -> String {
        let changer = SoundChanger::new();
        let sequence = changer.parse_sequence(sequence).unwrap();
        let rule = changer.parse_rule(rule).unwrap();
        changer.forward(&sequence, &rule).unwrap().to_string()
    }

    #[test]
    fn test_assimilation() {
        assert_eq!(forward("# a n p a #", "n > m / _ p"), "# a m p a #");
    }

    #[test]
    fn test_deletion() {
        assert_eq!(forward("# a p a #", "p > :null:"), "# a a #");
    }

    #[test]
    fn test_insertion_with_context() {
        assert_eq!(forward("# s t a #", ":null: > e / # _ s"), "# e s t a #");
    }

    #[test]
    fn test_intervocalic_voicing() {
        assert_eq!(forward("# a p a #", "C > @2[+voiced] / V _ V"), "# a b a #");
        // the vowel between p and t is consumed by the first match
        assert_eq!(forward("# a p a t a #", "C > @2[+voiced] / V _ V"), "# a b a t a #");
    }

    #[test]
    fn test_greedy_cluster_deletion() {
        assert_eq!(forward("# a s t #", "C+ > :null: / _ #"), "# a #");
    }

    #[test]
    fn test_set_correspondence() {
        assert_eq!(forward("# p a t a k #", "{p|t|k} > {f|θ|x}"), "# f a θ a x #");
    }

    #[test]
    fn test_no_match_is_identity() {
        assert_eq!(forward("# a a #", "p > b"), "# a a #");
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(forward("", "p > b"), "");
    }

    #[test]
    fn test_matches_are_non_overlapping() {
        // the second `a` is consumed as context, so the third starts no match
        assert_eq!(forward("# a a a #", "a > e / _ a"), "# e a a #");
    }

    #[test]
    fn test_syllable_conditioned_rule() {
        assert_eq!(forward("# p a t a n #", "C > :null: / _ :coda:"), "# p a t a n #");
        assert_eq!(forward("# p a t a n #", "n > :null: / _ #"), "# p a t a #");
        assert_eq!(forward("# p a s t a #", ":coda: > :null:"), "# p a t a #");
    }

    #[test]
    fn test_rejects_partial_sequence() {
        use crate::model::Sound;
        let changer = SoundChanger::new();
        let rule = changer.parse_rule("p > b").unwrap();
        let sequence = Sequence::from(vec![Element::Sound(Sound::partial("V", ["vowel"]))]);
        assert!(changer.forward(&sequence, &rule).is_err());
    }

    #[test]
    fn test_correspondence_sets_skip_referenced() {
        let changer = SoundChanger::new();
        let rule = changer.parse_rule("{a|e} {p|t} > @1 {b|d}").unwrap();
        assert_eq!(correspondence_sets(&rule).as_slice(), &[1]);
        assert_eq!(
            changer
                .forward(&changer.parse_sequence("# e t #").unwrap(), &rule)
                .unwrap()
                .to_string(),
            "# e d #"
        );
    }
}
