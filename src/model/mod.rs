//! Shared data model for rules and the sequences they rewrite.
//!
//! Sequence side:
//!
//! - [`Sound`] - a grapheme with its feature set (or an underspecified class)
//! - [`Element`] - a sound or a word boundary
//! - [`Sequence`] - ordered elements, the input and output of every rule operation
//!
//! Pattern side:
//!
//! - [`Token`] - one pattern element (segment, set, backreference, ...)
//! - [`Modifier`] - feature arithmetic attached to a backreference
//! - [`Rule`] - an ante pattern rewritten into a post pattern
//!
//! All values are immutable once built; operations return new values.

mod element;
mod rule;
mod token;

pub use element::{Element, FeatureSet, Sequence, Sound, BOUNDARY_MARKER};
pub use rule::Rule;
pub use token::{FeatureChange, Modifier, Polarity, Quantifier, SyllablePosition, Token};
