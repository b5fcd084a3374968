//! # libsoundchange
//!
//! Diachronic sound change rules: apply them forward, run them backward to
//! enumerate possible ancestors, apply them probabilistically, and analyse
//! how rule pairs interact when ordered.
//!
//! Rules use the familiar `ante > post / left _ right` notation:
//!
//! ```text
//! n > m / _ p              assimilation
//! p > :null:               deletion
//! C > @2[+voiced] / V _ V  intervocalic voicing via a modified backreference
//! {p|t|k} > {f|θ|x}        correspondence sets
//! C+ > :null: / _ #        final cluster loss
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use libsoundchange::prelude::*;
//!
//! let rule = parse_rule("n > m / _ p")?;
//! let word = parse_sequence("# a n p a #")?;
//!
//! let changed = forward(&word, &rule)?;
//! assert_eq!(changed.to_string(), "# a m p a #");
//!
//! let ancestors = backward(&changed, &rule)?;
//! assert!(ancestors.contains(&word));
//! ```
//!
//! The free functions use a shared [`SoundChanger`] with the built-in IPA
//! feature system; build your own `SoundChanger` to use a different
//! [`FeatureSystem`](features::FeatureSystem), syllabifier or
//! [`EngineConfig`](config::EngineConfig).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod parser;
pub mod syllable;

use once_cell::sync::Lazy;

pub use engine::{recommend_ordering, Interaction, InteractionKind, SoundChanger};
pub use error::{Error, ParseError, ParseErrorKind, Result};

use model::{Rule, Sequence};

static DEFAULT_CHANGER: Lazy<SoundChanger> = Lazy::new(SoundChanger::new);

/// The shared engine behind the crate-level functions.
pub fn default_changer() -> &'static SoundChanger {
    &DEFAULT_CHANGER
}

/// Parse rule text with the built-in IPA feature system.
pub fn parse_rule(text: &str) -> Result<Rule> {
    DEFAULT_CHANGER.parse_rule(text)
}

/// Parse a space-separated sequence with the built-in IPA feature system.
pub fn parse_sequence(text: &str) -> Result<Sequence> {
    DEFAULT_CHANGER.parse_sequence(text)
}

/// See [`SoundChanger::forward`].
pub fn forward(sequence: &Sequence, rule: &Rule) -> Result<Sequence> {
    DEFAULT_CHANGER.forward(sequence, rule)
}

/// See [`SoundChanger::backward`].
pub fn backward(post_sequence: &Sequence, rule: &Rule) -> Result<Vec<Sequence>> {
    DEFAULT_CHANGER.backward(post_sequence, rule)
}

/// See [`SoundChanger::apply_gradient`].
pub fn apply_gradient(sequence: &Sequence, rule_source: &str, strength: f64, seed: Option<u64>) -> Result<Sequence> {
    DEFAULT_CHANGER.apply_gradient(sequence, rule_source, strength, seed)
}

/// See [`SoundChanger::analyze_interactions`].
pub fn analyze_interactions(rules: &[Rule], probes: Option<&[Sequence]>) -> Result<Vec<Interaction>> {
    DEFAULT_CHANGER.analyze_interactions(rules, probes)
}

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Interaction, InteractionKind, ReconstructionTemplate, SoundChanger};
    pub use crate::error::{Error, ParseError, ParseErrorKind, Result};
    pub use crate::features::{FeatureSystem, IpaFeatures};
    pub use crate::model::{Element, Modifier, Rule, Sequence, Sound, Token};
    pub use crate::syllable::{SonoritySyllabifier, Syllabifier, SyllableMap};
    pub use crate::{
        analyze_interactions, apply_gradient, backward, forward, parse_rule, parse_sequence,
        recommend_ordering,
    };
}
