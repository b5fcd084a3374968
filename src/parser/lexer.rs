//! Splits rule text into lexemes.
//!
//! Rule text is a whitespace-separated list of atoms plus three structural
//! markers: `>` (ante/post separator), `/` (context separator) and `_`
//! (focus). Whitespace and markers inside `{…}` or `[…]` belong to the
//! enclosing atom.

use crate::error::{ParseError, ParseErrorKind};

/// Kind of a [`Lexeme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind {
    /// `>`
    Arrow,
    /// `/`
    Slash,
    /// `_`
    Focus,
    /// Any other token text
    Atom,
}

/// A piece of rule text with its character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'a> {
    /// Lexeme category
    pub kind: LexemeKind,
    /// Source text
    pub text: &'a str,
    /// Character offset of the first character
    pub position: usize,
}

/// Split rule text into lexemes.
///
/// Fails on unbalanced or mismatched brackets.
pub fn tokenize(text: &str) -> Result<Vec<Lexeme<'_>>, ParseError> {
    let mut lexemes = Vec::new();
    // (opening char, char position) of every open bracket
    let mut open: Vec<(char, usize)> = Vec::new();
    // (byte start, char start) of the atom being read
    let mut atom: Option<(usize, usize)> = None;

    for (position, (byte, c)) in text.char_indices().enumerate() {
        if !open.is_empty() {
            match c {
                '{' | '[' => open.push((c, position)),
                '}' | ']' => close_bracket(&mut open, c, position)?,
                _ => {}
            }
            continue;
        }

        match c {
            c if c.is_whitespace() => finish_atom(text, &mut atom, byte, &mut lexemes),
            '>' | '/' | '_' => {
                finish_atom(text, &mut atom, byte, &mut lexemes);
                let kind = match c {
                    '>' => LexemeKind::Arrow,
                    '/' => LexemeKind::Slash,
                    _ => LexemeKind::Focus,
                };
                lexemes.push(Lexeme {
                    kind,
                    text: &text[byte..byte + 1],
                    position,
                });
            }
            '}' | ']' => {
                return Err(ParseError::new(
                    ParseErrorKind::Lexical,
                    position,
                    format!("unexpected `{c}` without an opening bracket"),
                ));
            }
            _ => {
                if c == '{' || c == '[' {
                    open.push((c, position));
                }
                if atom.is_none() {
                    atom = Some((byte, position));
                }
            }
        }
    }

    if let Some(&(c, position)) = open.last() {
        return Err(ParseError::new(
            ParseErrorKind::Lexical,
            position,
            format!("unclosed `{c}`"),
        ));
    }
    finish_atom(text, &mut atom, text.len(), &mut lexemes);
    Ok(lexemes)
}

fn finish_atom<'a>(
    text: &'a str,
    atom: &mut Option<(usize, usize)>,
    end: usize,
    lexemes: &mut Vec<Lexeme<'a>>,
) {
    if let Some((start, position)) = atom.take() {
        lexemes.push(Lexeme {
            kind: LexemeKind::Atom,
            text: &text[start..end],
            position,
        });
    }
}

fn close_bracket(open: &mut Vec<(char, usize)>, c: char, position: usize) -> Result<(), ParseError> {
    let expected = match open.last() {
        Some(('{', _)) => '}',
        Some(('[', _)) => ']',
        _ => c,
    };
    if c != expected {
        return Err(ParseError::new(
            ParseErrorKind::Lexical,
            position,
            format!("expected `{expected}` but found `{c}`"),
        ));
    }
    open.pop();
    Ok(())
}

/// Split `text` at every `separator` that is not nested inside brackets.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (byte, c) in text.char_indices() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..byte]);
                start = byte + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
