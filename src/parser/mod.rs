//! Rule and sequence parsing.
//!
//! # Rule syntax
//!
//! ```text
//! ante > post [/ left _ right]
//! ```
//!
//! Atoms are separated by whitespace:
//!
//! | Atom               | Meaning                                          |
//! |--------------------|--------------------------------------------------|
//! | `p`, `aː`, `tʃ`    | IPA grapheme (concrete sound)                    |
//! | `V`, `C`, `N`, ... | sound class                                      |
//! | `[+voiced,-nasal]` | any sound with these features                    |
//! | `C[+voiced]`       | class narrowed by features                       |
//! | `p[+voiced]`       | grapheme with features applied (`b`)             |
//! | `#`                | word boundary                                    |
//! | `:null:`           | deletion (post) or insertion (ante)              |
//! | `@2[-voiced]`      | copy of ante position 2 (1-based), modified      |
//! | `{p\|t\|k}`        | correspondence set                               |
//! | `p\|b`             | choice                                           |
//! | `!V`               | negation                                         |
//! | `C+`, `V?`         | one-or-more, optional                            |
//! | `:onset:` ...      | syllable position (`onset`, `nucleus`, `coda`)   |
//!
//! The context is folded into the rule: `n > m / _ p` becomes ante `n p` and
//! post `m @2`.
//!
//! # Sequence syntax
//!
//! Space-separated graphemes and `#` boundaries: `# a n p a #`.

mod lexer;

pub use lexer::{split_top_level, tokenize, Lexeme, LexemeKind};

use crate::error::{ParseError, ParseErrorKind};
use crate::features::FeatureSystem;
use crate::model::{
    Element, FeatureSet, Modifier, Quantifier, Rule, Sequence, Sound, SyllablePosition, Token,
    BOUNDARY_MARKER,
};

const NULL_MARKER: &str = ":null:";

/// Parse a rule such as `p > b / V _ V`.
///
/// # Errors
///
/// - [`ParseErrorKind::Lexical`] for bracket problems and empty atoms
/// - [`ParseErrorKind::Syntax`] for misplaced `>`, `/` or `_`
/// - [`ParseErrorKind::Semantic`] for backreferences outside the ante and
///   correspondence sets without a matching ante set
/// - [`ParseErrorKind::Phonological`] for unknown graphemes, classes and
///   features
pub fn parse_rule<F: FeatureSystem + ?Sized>(text: &str, features: &F) -> Result<Rule, ParseError> {
    let source = text.trim();
    let lexemes = tokenize(source)?;

    let arrows: Vec<&Lexeme<'_>> = lexemes.iter().filter(|l| l.kind == LexemeKind::Arrow).collect();
    let slashes: Vec<&Lexeme<'_>> = lexemes.iter().filter(|l| l.kind == LexemeKind::Slash).collect();

    let arrow = match arrows.as_slice() {
        [] => {
            return Err(ParseError::new(ParseErrorKind::Syntax, source.chars().count(), "missing `>`")
                .with_suggestions(vec![format!("{source} > :null:")]))
        }
        [arrow] => *arrow,
        [_, second, ..] => {
            return Err(ParseError::new(
                ParseErrorKind::Syntax,
                second.position,
                "a rule has exactly one `>`",
            ))
        }
    };
    if let [_, second, ..] = slashes.as_slice() {
        return Err(ParseError::new(
            ParseErrorKind::Syntax,
            second.position,
            "a rule has at most one `/`",
        ));
    }
    if let Some(slash) = slashes.first() {
        if slash.position < arrow.position {
            return Err(ParseError::new(
                ParseErrorKind::Syntax,
                slash.position,
                "the context must follow the output side",
            ));
        }
    }

    let arrow_index = lexemes.iter().position(|l| l.kind == LexemeKind::Arrow).unwrap_or(0);
    let slash_index = lexemes.iter().position(|l| l.kind == LexemeKind::Slash);
    let ante_lexemes = &lexemes[..arrow_index];
    let post_lexemes = &lexemes[arrow_index + 1..slash_index.unwrap_or(lexemes.len())];
    let context_lexemes = slash_index.map(|i| &lexemes[i + 1..]);

    if let Some(focus) = ante_lexemes
        .iter()
        .chain(post_lexemes)
        .find(|l| l.kind == LexemeKind::Focus)
    {
        return Err(ParseError::new(
            ParseErrorKind::Syntax,
            focus.position,
            "`_` is only allowed in the context",
        ));
    }
    if ante_lexemes.is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, 0, "the input side is empty")
            .with_suggestions(vec![NULL_MARKER.to_string()]));
    }
    if post_lexemes.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::Syntax,
            arrow.position + 1,
            "the output side is empty",
        )
        .with_suggestions(vec![NULL_MARKER.to_string()]));
    }

    let focus_ante: Vec<Token> = parse_atoms(ante_lexemes, features)?
        .into_iter()
        .filter(|token| !token.is_empty_marker())
        .collect();
    let post = parse_atoms(post_lexemes, features)?;

    let (left, right) = match context_lexemes {
        Some(context) => split_context(parse_context(context, source, features)?),
        None => (Vec::new(), Vec::new()),
    };

    let left_len = left.len();
    let mut ante = Vec::with_capacity(left.len() + focus_ante.len() + right.len());
    let mut full_post = Vec::with_capacity(left.len() + post.len() + right.len());
    full_post.extend((0..left.len()).map(|index| Token::BackRef { index, modifier: None }));
    full_post.extend(post);
    let right_start = left.len() + focus_ante.len();
    full_post.extend((0..right.len()).map(|j| Token::BackRef {
        index: right_start + j,
        modifier: None,
    }));
    ante.extend(left);
    ante.extend(focus_ante);
    ante.extend(right);

    let rule = Rule::new(source, ante, full_post);
    check_semantics(&rule, left_len, post_lexemes)?;
    Ok(rule)
}

/// Parse a space-separated sequence such as `# a n p a #`.
///
/// # Errors
///
/// [`ParseErrorKind::Phonological`] for graphemes unknown to `features`.
pub fn parse_sequence<F: FeatureSystem + ?Sized>(
    text: &str,
    features: &F,
) -> Result<Sequence, ParseError> {
    let mut elements = Vec::new();
    let mut position = 0;
    for piece in text.split(char::is_whitespace) {
        if !piece.is_empty() {
            if piece == BOUNDARY_MARKER {
                elements.push(Element::Boundary);
            } else {
                let sound = features
                    .sound(piece)
                    .ok_or_else(|| unknown_grapheme(piece, position, features))?;
                elements.push(Element::Sound(sound));
            }
        }
        position += piece.chars().count() + 1;
    }
    Ok(Sequence::from(elements))
}

fn unknown_grapheme<F: FeatureSystem + ?Sized>(grapheme: &str, position: usize, features: &F) -> ParseError {
    ParseError::new(
        ParseErrorKind::Phonological,
        position,
        format!("unknown grapheme `{grapheme}`"),
    )
    .with_suggestions(features.suggestions(grapheme))
}

fn parse_atoms<F: FeatureSystem + ?Sized>(
    lexemes: &[Lexeme<'_>],
    features: &F,
) -> Result<Vec<Token>, ParseError> {
    lexemes
        .iter()
        .map(|lexeme| parse_atom(lexeme.text, lexeme.position, features))
        .collect()
}

/// Parse the context into tokens with a single [`Token::Focus`] marking `_`.
fn parse_context<F: FeatureSystem + ?Sized>(
    lexemes: &[Lexeme<'_>],
    source: &str,
    features: &F,
) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::with_capacity(lexemes.len());
    let mut focus_seen = false;
    for lexeme in lexemes {
        match lexeme.kind {
            LexemeKind::Focus if focus_seen => {
                return Err(ParseError::new(
                    ParseErrorKind::Syntax,
                    lexeme.position,
                    "the context has more than one `_`",
                ));
            }
            LexemeKind::Focus => {
                focus_seen = true;
                tokens.push(Token::Focus);
            }
            _ => tokens.push(parse_atom(lexeme.text, lexeme.position, features)?),
        }
    }
    if !focus_seen {
        return Err(ParseError::new(
            ParseErrorKind::Syntax,
            source.chars().count(),
            "the context needs a `_` marking the changed position",
        ));
    }
    Ok(tokens)
}

/// Split context tokens at the focus.
fn split_context(mut tokens: Vec<Token>) -> (Vec<Token>, Vec<Token>) {
    let focus = tokens
        .iter()
        .position(|t| matches!(t, Token::Focus))
        .unwrap_or(tokens.len());
    let right = tokens.split_off(focus).into_iter().skip(1).collect();
    (tokens, right)
}

/// Parse a single atom.
fn parse_atom<F: FeatureSystem + ?Sized>(text: &str, position: usize, features: &F) -> Result<Token, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::new(ParseErrorKind::Lexical, position, "empty token"));
    }

    let alternatives = split_top_level(text, '|');
    if alternatives.len() > 1 {
        return alternatives
            .into_iter()
            .map(|alt| parse_atom(alt, position, features))
            .collect::<Result<Vec<_>, _>>()
            .map(Token::Choice);
    }

    if let Some(rest) = text.strip_prefix('!') {
        return parse_atom(rest, position + 1, features).map(|inner| Token::Negation(Box::new(inner)));
    }

    if text.chars().count() > 1 {
        let quantifier = match text.chars().last() {
            Some('+') => Some(Quantifier::OneOrMore),
            Some('?') => Some(Quantifier::Optional),
            _ => None,
        };
        if let Some(quantifier) = quantifier {
            let inner = parse_atom(&text[..text.len() - 1], position, features)?;
            return Ok(Token::Quantified {
                inner: Box::new(inner),
                quantifier,
            });
        }
    }

    match text {
        BOUNDARY_MARKER => return Ok(Token::Boundary),
        NULL_MARKER => return Ok(Token::Empty),
        _ => {}
    }

    if let Some(name) = text.strip_prefix(':').and_then(|t| t.strip_suffix(':')) {
        return SyllablePosition::from_name(name)
            .map(Token::SyllableCond)
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::Lexical,
                    position,
                    format!("unknown marker `{text}`"),
                )
                .with_suggestions(vec![
                    NULL_MARKER.to_string(),
                    ":onset:".to_string(),
                    ":nucleus:".to_string(),
                    ":coda:".to_string(),
                ])
            });
    }

    if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        return split_top_level(inner, '|')
            .into_iter()
            .map(|alt| parse_atom(alt, position + 1, features))
            .collect::<Result<Vec<_>, _>>()
            .map(Token::Set);
    }

    if let Some(rest) = text.strip_prefix('@') {
        return parse_backref(rest, position, features);
    }

    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let pattern = parse_feature_pattern(inner, position, features)?;
        return Ok(Token::Segment(Sound {
            grapheme: text.to_string(),
            features: pattern,
            partial: true,
        }));
    }

    if let Some((head, bracket)) = text.split_once('[') {
        let inner = bracket.strip_suffix(']').ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::Lexical,
                position,
                format!("trailing text after `]` in `{text}`"),
            )
        })?;
        return match parse_atom(head, position, features)? {
            Token::Segment(sound) if sound.partial => {
                let mut narrowed = sound.features;
                narrowed.extend(parse_feature_pattern(inner, position, features)?);
                Ok(Token::Segment(Sound {
                    grapheme: text.to_string(),
                    features: narrowed,
                    partial: true,
                }))
            }
            Token::Segment(sound) => {
                let modifier = parse_modifier(inner, position, features)?;
                Ok(Token::Segment(features.modify_sound(&sound, &modifier)))
            }
            _ => Err(ParseError::new(
                ParseErrorKind::Syntax,
                position,
                format!("features can only follow a sound or class in `{text}`"),
            )),
        };
    }

    if let Some(class) = features.sound_class(text) {
        return Ok(Token::Segment(Sound {
            grapheme: text.to_string(),
            features: class,
            partial: true,
        }));
    }

    features
        .sound(text)
        .map(Token::Segment)
        .ok_or_else(|| unknown_grapheme(text, position, features))
}

fn parse_backref<F: FeatureSystem + ?Sized>(rest: &str, position: usize, features: &F) -> Result<Token, ParseError> {
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    let number: usize = rest[..digits_end].parse().map_err(|_| {
        ParseError::new(
            ParseErrorKind::Lexical,
            position,
            format!("`@{rest}` needs a position number"),
        )
        .with_suggestions(vec!["@1".to_string()])
    })?;
    if number == 0 {
        return Err(ParseError::new(
            ParseErrorKind::Semantic,
            position,
            "backreferences count from 1",
        )
        .with_suggestions(vec!["@1".to_string()]));
    }

    let tail = &rest[digits_end..];
    let modifier = if tail.is_empty() {
        None
    } else {
        let inner = tail
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::Lexical,
                    position,
                    format!("unexpected `{tail}` after backreference"),
                )
            })?;
        Some(parse_modifier(inner, position, features)?)
    };

    Ok(Token::BackRef {
        index: number - 1,
        modifier,
    })
}

fn parse_modifier<F: FeatureSystem + ?Sized>(inner: &str, position: usize, features: &F) -> Result<Modifier, ParseError> {
    let modifier = Modifier::parse(inner).map_err(|item| {
        ParseError::new(
            ParseErrorKind::Lexical,
            position,
            format!("malformed feature `{item}`"),
        )
    })?;
    if let Some(change) = modifier.changes().find(|c| !features.is_feature(&c.feature)) {
        return Err(ParseError::new(
            ParseErrorKind::Phonological,
            position,
            format!("unknown feature `{}`", change.feature),
        ));
    }
    Ok(modifier)
}

/// Feature pattern of a bracket class: `+f` and `f` require `f`, `-f`
/// forbids it.
fn parse_feature_pattern<F: FeatureSystem + ?Sized>(
    inner: &str,
    position: usize,
    features: &F,
) -> Result<FeatureSet, ParseError> {
    let modifier = parse_modifier(inner, position, features)?;
    Ok(modifier
        .changes()
        .map(|change| {
            if change.is_positive() {
                change.feature.clone()
            } else {
                format!("-{}", change.feature)
            }
        })
        .collect())
}

/// Checks that need the assembled rule.
fn check_semantics(rule: &Rule, left_len: usize, post_lexemes: &[Lexeme<'_>]) -> Result<(), ParseError> {
    // leading context backreferences have no lexeme of their own
    let position_of = |post_index: usize| {
        post_index
            .checked_sub(left_len)
            .and_then(|i| post_lexemes.get(i))
            .map_or(0, |l| l.position)
    };

    for (post_index, token) in rule.post.iter().enumerate() {
        match token {
            Token::BackRef { index, .. } if *index >= rule.ante.len() => {
                return Err(ParseError::new(
                    ParseErrorKind::Semantic,
                    position_of(post_index),
                    format!(
                        "`@{}` points past the input side, which has {} positions",
                        index + 1,
                        rule.ante.len()
                    ),
                )
                .with_suggestions((1..=rule.ante.len()).map(|i| format!("@{i}")).collect()));
            }
            Token::Quantified { .. } | Token::Negation(_) | Token::SyllableCond(_) => {
                return Err(ParseError::new(
                    ParseErrorKind::Semantic,
                    position_of(post_index),
                    format!("`{token}` describes a condition and cannot be produced"),
                ));
            }
            _ => {}
        }
    }

    if let Some(backref) = rule.ante.iter().find(|t| matches!(t, Token::BackRef { .. })) {
        return Err(ParseError::new(
            ParseErrorKind::Semantic,
            0,
            format!("`{backref}` is only allowed on the output side"),
        ));
    }

    let referenced: Vec<usize> = rule.referenced_ante().collect();
    let mut ante_sets = rule
        .ante
        .iter()
        .enumerate()
        .filter(|(i, t)| matches!(t, Token::Set(_)) && !referenced.contains(i))
        .map(|(_, t)| t);
    for (post_index, token) in rule.post.iter().enumerate() {
        let Token::Set(post_alternatives) = token else {
            continue;
        };
        match ante_sets.next() {
            Some(Token::Set(ante_alternatives)) if ante_alternatives.len() == post_alternatives.len() => {}
            Some(ante_set) => {
                return Err(ParseError::new(
                    ParseErrorKind::Semantic,
                    position_of(post_index),
                    format!("`{token}` and `{ante_set}` need the same number of alternatives"),
                ));
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::Semantic,
                    position_of(post_index),
                    format!("`{token}` has no corresponding set on the input side"),
                ));
            }
        }
    }
    Ok(())
}
