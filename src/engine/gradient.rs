//! Probabilistic application: each match site is rewritten with a given
//! probability.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::features::FeatureSystem;
use crate::model::{Rule, Sequence};
use crate::syllable::Syllabifier;

use super::{validate_rule, validate_sequence, SoundChanger};

impl<F: FeatureSystem, S: Syllabifier> SoundChanger<F, S> {
    /// Parse `rule_source` and apply it with probability `strength` per
    /// match site. See [`SoundChanger::apply_gradient_rule`].
    pub fn apply_gradient(
        &self,
        sequence: &Sequence,
        rule_source: &str,
        strength: f64,
        seed: Option<u64>,
    ) -> Result<Sequence> {
        let rule = self.parse_rule(rule_source)?;
        self.apply_gradient_rule(sequence, &rule, strength, seed)
    }

    /// Apply `rule` at each match site with probability `strength`.
    ///
    /// `strength <= 0` leaves the sequence unchanged and `strength >= 1` is
    /// [`SoundChanger::forward`]. In between, one uniform draw in `[0, 1)` is
    /// taken per site from a generator local to this call, and the site is
    /// rewritten when the draw is below `strength`. With the same `seed` the
    /// result is reproducible; without one the generator is seeded from the
    /// operating system.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a NaN `strength`, and for the same input
    /// problems as [`SoundChanger::forward`].
    pub fn apply_gradient_rule(
        &self,
        sequence: &Sequence,
        rule: &Rule,
        strength: f64,
        seed: Option<u64>,
    ) -> Result<Sequence> {
        if strength.is_nan() {
            return Err(Error::validation(
                "strength",
                "NaN",
                "pass a probability between 0.0 and 1.0",
            ));
        }
        validate_sequence("sequence", sequence)?;
        validate_rule(rule)?;

        if strength <= 0.0 {
            return Ok(sequence.clone());
        }
        if strength >= 1.0 {
            return self.forward(sequence, rule);
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut applied = 0usize;
        let output = self.rewrite(sequence, rule, |start| {
            let draw: f64 = rng.gen();
            let apply = draw < strength;
            trace!(start, draw, apply, "gradient draw");
            applied += usize::from(apply);
            apply
        });

        debug!(rule = %rule, strength, seeded = seed.is_some(), applied, "gradient");
        Ok(output)
    }
}
