//! Rule application engine.
//!
//! [`SoundChanger`] bundles a [`FeatureSystem`], a [`Syllabifier`] and an
//! [`EngineConfig`] and exposes every rule operation:
//!
//! - [`SoundChanger::forward`] - apply a rule to a sequence
//! - [`SoundChanger::backward`] - enumerate possible ancestors of a sequence
//! - [`SoundChanger::apply_gradient`] - apply a rule at each site with a
//!   probability
//! - [`SoundChanger::analyze_interactions`] - classify how rules interact
//!   under ordering
//!
//! # Usage
//!
//! ```rust,ignore
//! use libsoundchange::SoundChanger;
//!
//! let changer = SoundChanger::new();
//! let rule = changer.parse_rule("n > m / _ p")?;
//! let word = changer.parse_sequence("# a n p a #")?;
//! assert_eq!(changer.forward(&word, &rule)?.to_string(), "# a m p a #");
//! ```
//!
//! Every operation is a pure function of its arguments; a `SoundChanger` can
//! be shared between threads as long as its feature system and syllabifier
//! can.

pub mod backward;
pub mod forward;
pub mod gradient;
pub mod interaction;
pub mod matching;
pub mod scan;

pub use backward::ReconstructionTemplate;
pub use interaction::{recommend_ordering, Interaction, InteractionKind};
pub use matching::{length_bounds, match_one, match_pattern, Binding, MatchContext, MatchResult};
pub use scan::{ScanStep, WindowScanner};

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::features::{FeatureSystem, IpaFeatures};
use crate::model::{Rule, Sequence};
use crate::parser;
use crate::syllable::{SonoritySyllabifier, Syllabifier};

/// Sound change engine over a feature system `F` and a syllabifier `S`.
#[derive(Debug, Clone, Default)]
pub struct SoundChanger<F = IpaFeatures, S = SonoritySyllabifier> {
    features: F,
    syllabifier: S,
    config: EngineConfig,
}

impl SoundChanger {
    /// Engine with the built-in IPA feature system, sonority
    /// syllabification and default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default components with the configuration read from a JSON file.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the file cannot be read, parsed or validated.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = EngineConfig::load(path)?;
        Ok(Self::new().with_config(config))
    }
}

impl<F: FeatureSystem, S: Syllabifier> SoundChanger<F, S> {
    /// Engine with custom components.
    pub fn with_components(features: F, syllabifier: S, config: EngineConfig) -> Self {
        Self {
            features,
            syllabifier,
            config,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Feature system in use.
    pub fn features(&self) -> &F {
        &self.features
    }

    /// Syllabifier in use.
    pub fn syllabifier(&self) -> &S {
        &self.syllabifier
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse rule text against this engine's feature system.
    pub fn parse_rule(&self, text: &str) -> Result<Rule> {
        Ok(parser::parse_rule(text, &self.features)?)
    }

    /// Parse a space-separated sequence against this engine's feature system.
    pub fn parse_sequence(&self, text: &str) -> Result<Sequence> {
        Ok(parser::parse_sequence(text, &self.features)?)
    }
}

/// Sequences handed to rule operations must be fully specified.
pub(crate) fn validate_sequence(parameter: &'static str, sequence: &Sequence) -> Result<()> {
    match sequence.first_partial() {
        Some(position) => Err(Error::validation(
            parameter,
            format!("underspecified sound `{}` at position {position}", sequence[position]),
            "use concrete sounds in sequences; sound classes belong in rule patterns",
        )),
        None => Ok(()),
    }
}

/// Backreferences must point into the ante.
pub(crate) fn validate_rule(rule: &Rule) -> Result<()> {
    match rule.dangling_backref() {
        Some(index) => Err(Error::validation(
            "rule",
            format!(
                "backreference @{} in `{}` but the input side has {} position(s)",
                index + 1,
                rule.source,
                rule.ante.len()
            ),
            "build rules with parse_rule, which checks backreference ranges",
        )),
        None => Ok(()),
    }
}
