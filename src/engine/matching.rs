//! Pattern matching of sequence windows against token patterns.
//!
//! Two strategies are used:
//!
//! - **Fixed matching** when the pattern has no quantifier: window and
//!   pattern must have the same length and every position is matched
//!   independently.
//! - **Variable matching** otherwise: recursive backtracking over
//!   `(sequence index, pattern index)`. `+` is greedy (longest run first),
//!   `?` tries zero occurrences before one. The window is anchored at both
//!   ends, so a match consumes it completely.
//!
//! Matching is total: every attempt yields a [`MatchResult`], never an error.

use smallvec::SmallVec;

use crate::features::FeatureSystem;
use crate::model::{Element, Quantifier, Token};
use crate::syllable::SyllableMap;

/// What a single pattern token bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The matched element (last one consumed for `+`)
    Element(Element),
    /// A correspondence set matched through alternative `index`
    Alternative {
        /// Index of the alternative that matched
        index: usize,
        /// The matched element
        element: Element,
    },
}

impl Binding {
    /// The element bound, whichever the variant.
    #[inline]
    pub fn element(&self) -> &Element {
        match self {
            Binding::Element(element) | Binding::Alternative { element, .. } => element,
        }
    }

    /// Alternative index for set bindings.
    #[inline]
    pub fn alternative(&self) -> Option<usize> {
        match self {
            Binding::Alternative { index, .. } => Some(*index),
            Binding::Element(_) => None,
        }
    }
}

/// Outcome of matching one window against a pattern.
///
/// `bindings` is aligned with the pattern tokens; entries are `None` on
/// failure and for `?` tokens that matched zero elements. `span` is the
/// number of window elements consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Whether the window matched
    pub matched: bool,
    /// One entry per pattern token
    pub bindings: Vec<Option<Binding>>,
    /// Elements consumed
    pub span: usize,
}

impl MatchResult {
    fn failure(pattern_len: usize) -> Self {
        Self {
            matched: false,
            bindings: vec![None; pattern_len],
            span: 0,
        }
    }

    /// Binding of pattern position `index`, if it bound anything.
    #[inline]
    pub fn binding(&self, index: usize) -> Option<&Binding> {
        self.bindings.get(index).and_then(Option::as_ref)
    }
}

/// Everything matching needs besides the window and the pattern.
pub struct MatchContext<'a, F: FeatureSystem + ?Sized> {
    /// Feature system used for sound-class subsumption
    pub features: &'a F,
    /// Syllable roles of the whole sequence, for syllable-conditioned rules
    pub syllables: Option<&'a SyllableMap>,
    /// Absolute position of the window's first element in its sequence
    pub offset: usize,
}

impl<'a, F: FeatureSystem + ?Sized> MatchContext<'a, F> {
    /// Context without syllable information at offset 0.
    pub fn new(features: &'a F) -> Self {
        Self {
            features,
            syllables: None,
            offset: 0,
        }
    }

    /// Attach a syllable map.
    pub fn with_syllables(mut self, syllables: Option<&'a SyllableMap>) -> Self {
        self.syllables = syllables;
        self
    }

    /// Same context for a window starting at `offset`.
    pub fn at(&self, offset: usize) -> Self {
        Self { offset, ..*self }
    }
}

impl<F: FeatureSystem + ?Sized> Clone for MatchContext<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: FeatureSystem + ?Sized> Copy for MatchContext<'_, F> {}

/// Match a single element at window position `position` against a token.
///
/// Returns the binding on success, `None` otherwise.
pub fn match_one<F: FeatureSystem + ?Sized>(
    element: &Element,
    position: usize,
    token: &Token,
    ctx: &MatchContext<'_, F>,
) -> Option<Binding> {
    let bind = || Binding::Element(element.clone());
    match token {
        Token::Boundary => element.is_boundary().then(bind),
        Token::Segment(pattern) => {
            let sound = element.as_sound()?;
            let matched = if pattern.partial {
                ctx.features.partial_match(&pattern.features, &sound.features)
            } else {
                pattern.same_sound(sound)
            };
            matched.then(bind)
        }
        Token::Choice(alternatives) => alternatives
            .iter()
            .any(|alt| match_one(element, position, alt, ctx).is_some())
            .then(bind),
        Token::Set(alternatives) => alternatives
            .iter()
            .position(|alt| match_one(element, position, alt, ctx).is_some())
            .map(|index| Binding::Alternative {
                index,
                element: element.clone(),
            }),
        Token::SyllableCond(role) => {
            let assigned = ctx.syllables?.role(ctx.offset + position)?;
            (assigned == *role).then(bind)
        }
        Token::Negation(inner) => match_one(element, position, inner, ctx).is_none().then(bind),
        Token::Quantified { inner, .. } => match_one(element, position, inner, ctx),
        Token::Focus | Token::Empty | Token::BackRef { .. } => None,
    }
}

/// Match a whole window against a pattern.
///
/// # Examples
///
/// ```rust,ignore
/// use libsoundchange::engine::{match_pattern, MatchContext};
///
/// let ctx = MatchContext::new(&features);
/// let result = match_pattern(&window, &rule.ante, &ctx);
/// if result.matched {
///     println!("consumed {} elements", result.span);
/// }
/// ```
pub fn match_pattern<F: FeatureSystem + ?Sized>(
    window: &[Element],
    pattern: &[Token],
    ctx: &MatchContext<'_, F>,
) -> MatchResult {
    if pattern.iter().any(Token::is_quantified) {
        match_variable(window, pattern, ctx)
    } else {
        match_fixed(window, pattern, ctx)
    }
}

fn match_fixed<F: FeatureSystem + ?Sized>(
    window: &[Element],
    pattern: &[Token],
    ctx: &MatchContext<'_, F>,
) -> MatchResult {
    if window.len() != pattern.len() {
        return MatchResult::failure(pattern.len());
    }

    let bindings: Option<Vec<Option<Binding>>> = window
        .iter()
        .zip(pattern)
        .enumerate()
        .map(|(i, (element, token))| match_one(element, i, token, ctx).map(Some))
        .collect();

    match bindings {
        Some(bindings) => MatchResult {
            matched: true,
            bindings,
            span: window.len(),
        },
        None => MatchResult::failure(pattern.len()),
    }
}

fn match_variable<F: FeatureSystem + ?Sized>(
    window: &[Element],
    pattern: &[Token],
    ctx: &MatchContext<'_, F>,
) -> MatchResult {
    let mut bindings = Vec::with_capacity(pattern.len());
    match match_from(window, pattern, 0, 0, ctx, &mut bindings) {
        Some(span) => MatchResult {
            matched: true,
            bindings,
            span,
        },
        None => MatchResult::failure(pattern.len()),
    }
}

/// Backtracking step. On success `bindings` holds one entry per pattern
/// token and the consumed length is returned; on failure `bindings` is left
/// as it was on entry.
fn match_from<F: FeatureSystem + ?Sized>(
    window: &[Element],
    pattern: &[Token],
    seq_idx: usize,
    pat_idx: usize,
    ctx: &MatchContext<'_, F>,
    bindings: &mut Vec<Option<Binding>>,
) -> Option<usize> {
    let Some(token) = pattern.get(pat_idx) else {
        return (seq_idx == window.len()).then_some(seq_idx);
    };

    match token {
        Token::Quantified {
            inner,
            quantifier: Quantifier::OneOrMore,
        } => {
            let run: SmallVec<[Binding; 8]> = window[seq_idx..]
                .iter()
                .enumerate()
                .map_while(|(k, element)| match_one(element, seq_idx + k, inner, ctx))
                .collect();

            for n in (1..=run.len()).rev() {
                bindings.push(Some(run[n - 1].clone()));
                if let Some(span) = match_from(window, pattern, seq_idx + n, pat_idx + 1, ctx, bindings) {
                    return Some(span);
                }
                bindings.pop();
            }
            None
        }
        Token::Quantified {
            inner,
            quantifier: Quantifier::Optional,
        } => {
            bindings.push(None);
            if let Some(span) = match_from(window, pattern, seq_idx, pat_idx + 1, ctx, bindings) {
                return Some(span);
            }
            bindings.pop();
            consume_one(window, pattern, seq_idx, pat_idx, inner, ctx, bindings)
        }
        _ => consume_one(window, pattern, seq_idx, pat_idx, token, ctx, bindings),
    }
}

/// Match exactly one element against `token`, then the rest of the pattern.
fn consume_one<F: FeatureSystem + ?Sized>(
    window: &[Element],
    pattern: &[Token],
    seq_idx: usize,
    pat_idx: usize,
    token: &Token,
    ctx: &MatchContext<'_, F>,
    bindings: &mut Vec<Option<Binding>>,
) -> Option<usize> {
    let binding = window
        .get(seq_idx)
        .and_then(|element| match_one(element, seq_idx, token, ctx))?;
    bindings.push(Some(binding));
    let result = match_from(window, pattern, seq_idx + 1, pat_idx + 1, ctx, bindings);
    if result.is_none() {
        bindings.pop();
    }
    result
}

/// Minimum and maximum number of elements a pattern can match.
///
/// `+` contributes `[1, bound]`, `?` `[0, 1]`, `Empty` and `Focus` nothing,
/// everything else exactly one.
pub fn length_bounds(pattern: &[Token], bound: usize) -> (usize, usize) {
    pattern.iter().fold((0, 0), |(min, max), token| {
        let (lo, hi) = match token {
            Token::Quantified {
                quantifier: Quantifier::OneOrMore,
                ..
            } => (1, bound),
            Token::Quantified {
                quantifier: Quantifier::Optional,
                ..
            } => (0, 1),
            Token::Empty | Token::Focus => (0, 0),
            _ => (1, 1),
        };
        (min + lo, max.saturating_add(hi))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::IpaFeatures;
    use crate::model::{Sequence, SyllablePosition};
    use crate::parser::{parse_rule, parse_sequence};
    use crate::syllable::{SonoritySyllabifier, Syllabifier};

    fn seq(text: &str) -> Sequence {
        parse_sequence(text, &IpaFeatures::new()).unwrap()
    }

    fn ante(rule: &str) -> Vec<Token> {
        parse_rule(rule, &IpaFeatures::new()).unwrap().ante
    }

    fn matches(window: &str, rule: &str) -> MatchResult {
        let ipa = IpaFeatures::new();
        match_pattern(&seq(window), &ante(rule), &MatchContext::new(&ipa))
    }

    #[test]
    fn test_fixed_match_binds_every_position() {
        let result = matches("n p", "n > m / _ p");
        assert!(result.matched);
        assert_eq!(result.span, 2);
        assert_eq!(result.bindings.len(), 2);
        assert_eq!(result.binding(0).unwrap().element().to_string(), "n");
    }

    #[test]
    fn test_fixed_length_mismatch_fails_with_empty_bindings() {
        let result = matches("n p a", "n > m / _ p");
        assert!(!result.matched);
        assert_eq!(result.bindings, vec![None, None]);
    }

    #[test]
    fn test_fixed_mismatch() {
        assert!(!matches("n t", "n > m / _ p").matched);
    }

    #[test]
    fn test_partial_sound_subsumption() {
        assert!(matches("a b a", "b > v / V _ V").matched);
        assert!(!matches("a b t", "b > v / V _ V").matched);
        assert!(matches("z", "[+voiced,-nasal] > s").matched);
        assert!(!matches("n", "[+voiced,-nasal] > s").matched);
    }

    #[test]
    fn test_boundary_token() {
        assert!(matches("t #", "t > d / _ #").matched);
        assert!(!matches("t a", "t > d / _ #").matched);
    }

    #[test]
    fn test_set_records_alternative_index() {
        let result = matches("k", "{p|t|k} > {b|d|g}");
        assert!(result.matched);
        assert_eq!(result.binding(0).unwrap().alternative(), Some(2));
    }

    #[test]
    fn test_choice_binds_element_not_index() {
        let result = matches("b", "p|b > f");
        assert!(result.matched);
        assert_eq!(result.binding(0), Some(&Binding::Element(seq("b")[0].clone())));
        assert_eq!(result.binding(0).unwrap().alternative(), None);
    }

    #[test]
    fn test_negation() {
        assert!(matches("a t", "t > d / !# _").matched);
        assert!(!matches("# t", "t > d / !# _").matched);
    }

    #[test]
    fn test_plus_is_greedy() {
        let result = matches("s t #", "C+ > :null: / _ #");
        assert!(result.matched);
        assert_eq!(result.span, 3);
        // binding of the quantified token is the last consumed element
        assert_eq!(result.binding(0).unwrap().element().to_string(), "t");
    }

    #[test]
    fn test_plus_backtracks_to_leave_room() {
        // C+ must give back one consonant for the trailing t
        let result = matches("s p t", "C+ > :null: / _ t");
        assert!(result.matched);
        assert_eq!(result.binding(0).unwrap().element().to_string(), "p");
    }

    #[test]
    fn test_plus_needs_one() {
        assert!(!matches("#", "C+ > :null: / _ #").matched);
    }

    #[test]
    fn test_optional_prefers_zero() {
        let ipa = IpaFeatures::new();
        let pattern = ante("a C? > e");

        let zero = match_pattern(&seq("a"), &pattern, &MatchContext::new(&ipa));
        assert!(zero.matched);
        assert_eq!(zero.bindings[1], None);

        // anchored window forces the single occurrence
        let one = match_pattern(&seq("a t"), &pattern, &MatchContext::new(&ipa));
        assert!(one.matched);
        assert_eq!(one.span, 2);
        assert_eq!(one.binding(1).unwrap().element().to_string(), "t");
    }

    #[test]
    fn test_variable_match_must_consume_window() {
        assert!(!matches("s t a", "C+ > :null: / _ #").matched);
    }

    #[test]
    fn test_syllable_condition_uses_offset() {
        let ipa = IpaFeatures::new();
        let sequence = seq("# a t a #");
        let map = SonoritySyllabifier.build_syllable_map(&sequence);
        let pattern = vec![Token::SyllableCond(SyllablePosition::Onset)];
        let ctx = MatchContext::new(&ipa).with_syllables(Some(&map));

        assert!(match_pattern(&sequence[2..3], &pattern, &ctx.at(2)).matched);
        assert!(!match_pattern(&sequence[1..2], &pattern, &ctx.at(1)).matched);
        // without a map nothing has a role
        assert!(!match_pattern(&sequence[2..3], &pattern, &MatchContext::new(&ipa).at(2)).matched);
    }

    #[test]
    fn test_structural_tokens_never_match() {
        let ipa = IpaFeatures::new();
        let ctx = MatchContext::new(&ipa);
        let element = seq("a")[0].clone();
        assert!(match_one(&element, 0, &Token::Focus, &ctx).is_none());
        assert!(match_one(&element, 0, &Token::Empty, &ctx).is_none());
        assert!(match_one(&element, 0, &Token::BackRef { index: 0, modifier: None }, &ctx).is_none());
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(length_bounds(&ante("n > m / _ p"), 10), (2, 2));
        assert_eq!(length_bounds(&ante("C+ > :null: / _ #"), 10), (2, 11));
        assert_eq!(length_bounds(&ante("a C? > e"), 10), (1, 2));
        assert_eq!(length_bounds(&[Token::Empty, Token::Focus], 10), (0, 0));
    }
}
