//! Backward reconstruction: enumerate the sequences a rule could have
//! turned into a given output.
//!
//! The post side of the rule (with backreferences resolved to the ante
//! tokens they copy) becomes a matching pattern over the output. Every
//! matched window is ambiguous: it may be an untouched stretch that merely
//! looks like rule output, or the product of the rule. Both readings are
//! kept, and the readings of all windows are multiplied out.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::error::Result;
use crate::features::FeatureSystem;
use crate::model::{Element, Modifier, Quantifier, Rule, Sequence, Token};
use crate::syllable::Syllabifier;

use super::forward::correspondence_sets;
use super::matching::{Binding, MatchContext, MatchResult};
use super::scan::{ScanStep, WindowScanner};
use super::{validate_rule, validate_sequence, SoundChanger};

/// Where an output-pattern position gets its information from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PostSource {
    /// Copy of an ante position; the inverse modifier undoes the forward one
    Copy { ante: usize, inverse: Option<Modifier> },
    /// Correspondence set paired with an ante set, if there is one
    Set { ante: Option<usize> },
    /// Literal output
    Literal,
}

/// A rule prepared for running backwards.
///
/// `tokens` is the ante with the inverse of every backreference modifier
/// carried onto the referenced position; `output_pattern` is what the rule
/// writes, as a pattern the matcher can run over a changed sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionTemplate {
    tokens: Vec<Token>,
    output_pattern: Vec<Token>,
    sources: Vec<PostSource>,
}

impl ReconstructionTemplate {
    /// Prepare `rule` for reconstruction.
    pub fn new<F: FeatureSystem + ?Sized>(rule: &Rule, features: &F) -> Self {
        let mut tokens = rule.ante.clone();
        for token in &rule.post {
            if let Token::BackRef {
                index,
                modifier: Some(modifier),
            } = token
            {
                if let Some(slot) = tokens.get_mut(*index) {
                    *slot = features.modify_token(slot, &modifier.inverse());
                }
            }
        }

        let mut set_sources = correspondence_sets(rule).into_iter();
        let mut output_pattern = Vec::with_capacity(rule.post.len());
        let mut sources = Vec::with_capacity(rule.post.len());

        for token in rule.post_without_empties() {
            match token {
                Token::BackRef { index, modifier } => {
                    let Some(base) = rule.ante.get(*index) else {
                        continue;
                    };
                    output_pattern.push(match modifier {
                        Some(modifier) => features.modify_token(base, modifier),
                        None => base.clone(),
                    });
                    sources.push(PostSource::Copy {
                        ante: *index,
                        inverse: modifier.as_ref().map(Modifier::inverse),
                    });
                }
                Token::Set(_) => {
                    output_pattern.push(token.clone());
                    sources.push(PostSource::Set {
                        ante: set_sources.next(),
                    });
                }
                _ => {
                    output_pattern.push(token.clone());
                    sources.push(PostSource::Literal);
                }
            }
        }

        Self {
            tokens,
            output_pattern,
            sources,
        }
    }

    /// The ante with inverse modifiers applied.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The pattern matched against changed sequences.
    pub fn output_pattern(&self) -> &[Token] {
        &self.output_pattern
    }

    /// Ante forms of one matched output window.
    ///
    /// A copied position whose output binding is empty (a `?` that matched
    /// nothing) contributes nothing. An optional ante position the output
    /// does not copy is ambiguous, so it yields one ancestor without the
    /// occurrence and one with it, in that order.
    pub fn reconstruct<F: FeatureSystem + ?Sized>(&self, result: &MatchResult, features: &F) -> Vec<Vec<Element>> {
        let mut copies: FxHashMap<usize, Option<Element>> = FxHashMap::default();
        let mut choices: FxHashMap<usize, usize> = FxHashMap::default();

        for (position, source) in self.sources.iter().enumerate() {
            match (source, result.binding(position)) {
                (PostSource::Copy { ante, inverse }, Some(binding)) => {
                    let element = match inverse {
                        Some(inverse) => features.modify_element(binding.element(), inverse),
                        None => binding.element().clone(),
                    };
                    copies.insert(*ante, Some(element));
                }
                (PostSource::Copy { ante, .. }, None) => {
                    copies.insert(*ante, None);
                }
                (PostSource::Set { ante: Some(ante) }, Some(Binding::Alternative { index, .. })) => {
                    choices.insert(*ante, *index);
                }
                _ => {}
            }
        }

        let positions: Vec<Vec<Vec<Element>>> = self
            .tokens
            .iter()
            .enumerate()
            .map(|(position, token)| {
                if let Some(copied) = copies.remove(&position) {
                    return vec![copied.into_iter().collect()];
                }
                match (token, choices.get(&position)) {
                    (Token::Set(alternatives), Some(&index)) => {
                        vec![alternatives.get(index).and_then(Token::template_element).into_iter().collect()]
                    }
                    (
                        Token::Quantified {
                            inner,
                            quantifier: Quantifier::Optional,
                        },
                        _,
                    ) => vec![Vec::new(), inner.template_element().into_iter().collect()],
                    _ => vec![token.template_element().into_iter().collect()],
                }
            })
            .collect();

        cartesian(&positions)
    }
}

impl<F: FeatureSystem, S: Syllabifier> SoundChanger<F, S> {
    /// Every sequence that `rule` could have turned into `post_sequence`.
    ///
    /// The literal reading (the rule never applied) is always among the
    /// candidates when it is well formed. Candidates are boundary-wrapped
    /// and de-duplicated according to the engine configuration; candidates
    /// with a boundary anywhere but at their edges are dropped.
    ///
    /// Ante positions the output says nothing about (a deleted class, the
    /// unchosen side of a choice) are written out from the rule: a class
    /// such as `C` appears as an underspecified sound. Such a candidate
    /// describes a family of ancestors. It is not a well-formed input, and
    /// passing it to [`forward`](SoundChanger::forward) is a validation
    /// error.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`](crate::Error::Validation) if `post_sequence`
    /// holds an underspecified sound or `rule` has a backreference outside
    /// its ante.
    pub fn backward(&self, post_sequence: &Sequence, rule: &Rule) -> Result<Vec<Sequence>> {
        validate_sequence("post_sequence", post_sequence)?;
        validate_rule(rule)?;

        if post_sequence.is_empty() {
            return Ok(vec![post_sequence.clone()]);
        }

        let template = ReconstructionTemplate::new(rule, &self.features);
        let chunks = self.chunk_candidates(post_sequence, &template);
        let total = chunks.iter().fold(1usize, |acc, c| acc.saturating_mul(c.len()));

        let mut seen = FxHashSet::default();
        let candidates: Vec<Sequence> = cartesian(&chunks)
            .into_iter()
            .map(|elements| {
                let sequence = Sequence::from(elements);
                if self.config.wrap_boundaries {
                    sequence.wrapped()
                } else {
                    sequence
                }
            })
            .filter(|candidate| !candidate.has_internal_boundary())
            .filter(|candidate| !self.config.dedup_candidates || seen.insert(candidate.clone()))
            .collect();

        debug!(
            rule = %rule,
            chunks = chunks.len(),
            combinations = total,
            candidates = candidates.len(),
            "backward"
        );
        Ok(candidates)
    }

    /// Alternatives for each stretch of `post_sequence`.
    fn chunk_candidates(&self, post_sequence: &Sequence, template: &ReconstructionTemplate) -> Vec<Vec<Vec<Element>>> {
        let pattern = template.output_pattern();
        if pattern.is_empty() {
            return post_sequence.iter().map(|e| vec![vec![e.clone()]]).collect();
        }

        let syllables = pattern
            .iter()
            .any(Token::uses_syllables)
            .then(|| self.syllabifier.build_syllable_map(post_sequence));
        let ctx = MatchContext::new(&self.features).with_syllables(syllables.as_ref());

        WindowScanner::new(post_sequence, pattern, ctx, self.config.quantifier_bound)
            .map(|step| match step {
                ScanStep::Copy(element) => vec![vec![element.clone()]],
                ScanStep::Match { start, window, result } => {
                    let ancestors = template.reconstruct(&result, &self.features);
                    trace!(start, span = window.len(), readings = ancestors.len(), "reconstruction site");
                    let mut readings = Vec::with_capacity(ancestors.len() + 1);
                    readings.push(window.to_vec());
                    readings.extend(ancestors);
                    readings
                }
            })
            .collect()
    }
}

/// Every concatenation that picks one alternative per chunk, in order.
fn cartesian(chunks: &[Vec<Vec<Element>>]) -> Vec<Vec<Element>> {
    chunks.iter().fold(vec![Vec::new()], |prefixes, alternatives| {
        prefixes
            .iter()
            .flat_map(|prefix| {
                alternatives.iter().map(move |alternative| {
                    let mut combined = prefix.clone();
                    combined.extend(alternative.iter().cloned());
                    combined
                })
            })
            .collect()
    })
}
