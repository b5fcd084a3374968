//! Pairwise rule interaction analysis and ordering recommendations.
//!
//! For a pair `(A, B)` (A listed first) and a probe sequence `p`, the
//! classifier compares `B(p)`, `B(A(p))`, `A(p)`, `A(B(p))`:
//!
//! | condition                                                | verdict         |
//! |----------------------------------------------------------|-----------------|
//! | `B` leaves `p` alone but changes `A(p)`                  | FEEDING         |
//! | `B` changes `p` but leaves `A(p)` alone                  | BLEEDING        |
//! | order matters, `A` leaves `p` alone but changes `B(p)`   | COUNTERFEEDING  |
//! | order matters, `A` changes `p` but leaves `B(p)` alone   | COUNTERBLEEDING |
//! | order matters otherwise                                  | FEEDING         |
//! | otherwise                                                | INDEPENDENT     |
//!
//! The last order-dependent row is a fallback: pairs whose outputs differ
//! by order for reasons other than feeding may be reported as FEEDING.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::features::FeatureSystem;
use crate::model::{Element, Rule, Sequence, Token};
use crate::syllable::Syllabifier;

use super::{validate_rule, validate_sequence, SoundChanger};

/// How two rules interact when applied in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionKind {
    /// The first rule creates contexts for the second
    Feeding,
    /// The first rule destroys contexts of the second
    Bleeding,
    /// The second rule would create contexts for the first
    Counterfeeding,
    /// The second rule would destroy contexts of the first
    Counterbleeding,
    /// Order does not matter on any probe
    Independent,
}

impl InteractionKind {
    /// Upper-case name, e.g. `FEEDING`.
    pub fn name(self) -> &'static str {
        match self {
            InteractionKind::Feeding => "FEEDING",
            InteractionKind::Bleeding => "BLEEDING",
            InteractionKind::Counterfeeding => "COUNTERFEEDING",
            InteractionKind::Counterbleeding => "COUNTERBLEEDING",
            InteractionKind::Independent => "INDEPENDENT",
        }
    }

    /// Feeding and bleeding force the first rule before the second.
    pub fn requires_precedence(self) -> bool {
        matches!(self, InteractionKind::Feeding | InteractionKind::Bleeding)
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of one rule pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Rule listed first (`A`)
    pub first: Rule,
    /// Rule listed second (`B`)
    pub second: Rule,
    /// Verdict
    pub kind: InteractionKind,
    /// First probe that showed the interaction
    pub example: Option<Sequence>,
}

impl<F, S> SoundChanger<F, S>
where
    F: FeatureSystem + Sync,
    S: Syllabifier + Sync,
{
    /// Classify every pair `(rules[i], rules[j])` with `i < j`.
    ///
    /// With `probes` the same sequences are tried for every pair; otherwise
    /// each pair is probed with the literal sounds of its input sides. The
    /// first probe that gives a verdict other than INDEPENDENT decides.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`](crate::Error::Validation) for an
    /// underspecified probe or a rule with a dangling backreference.
    pub fn analyze_interactions(
        &self,
        rules: &[Rule],
        probes: Option<&[Sequence]>,
    ) -> Result<Vec<Interaction>> {
        for rule in rules {
            validate_rule(rule)?;
        }
        for probe in probes.unwrap_or_default() {
            validate_sequence("probes", probe)?;
        }

        let pairs: Vec<(usize, usize)> = (0..rules.len())
            .flat_map(|i| (i + 1..rules.len()).map(move |j| (i, j)))
            .collect();

        let classify = |&(i, j): &(usize, usize)| self.classify_pair(&rules[i], &rules[j], probes);

        #[cfg(feature = "parallel")]
        let interactions: Vec<Interaction> = pairs.par_iter().map(classify).collect();
        #[cfg(not(feature = "parallel"))]
        let interactions: Vec<Interaction> = pairs.iter().map(classify).collect();

        debug!(
            rules = rules.len(),
            pairs = interactions.len(),
            dependent = interactions
                .iter()
                .filter(|i| i.kind != InteractionKind::Independent)
                .count(),
            "interaction analysis"
        );
        Ok(interactions)
    }

    fn classify_pair(&self, a: &Rule, b: &Rule, probes: Option<&[Sequence]>) -> Interaction {
        let generated;
        let probes = match probes {
            Some(probes) => probes,
            None => {
                generated = default_probes(a, b);
                &generated[..]
            }
        };

        let verdict = probes.iter().find_map(|probe| {
            let kind = self.classify_probe(a, b, probe);
            (kind != InteractionKind::Independent).then(|| (kind, probe.clone()))
        });

        let (kind, example) = match verdict {
            Some((kind, probe)) => (kind, Some(probe)),
            None => (InteractionKind::Independent, None),
        };
        Interaction {
            first: a.clone(),
            second: b.clone(),
            kind,
            example,
        }
    }

    fn classify_probe(&self, a: &Rule, b: &Rule, probe: &Sequence) -> InteractionKind {
        let apply = |rule: &Rule, sequence: &Sequence| self.rewrite(sequence, rule, |_| true);

        let after_a = apply(a, probe);
        let after_b = apply(b, probe);
        let a_then_b = apply(b, &after_a);
        let b_then_a = apply(a, &after_b);

        let b_alone = after_b != *probe;
        let b_after_a = a_then_b != after_a;
        let a_alone = after_a != *probe;
        let a_after_b = b_then_a != after_b;

        if !b_alone && b_after_a {
            InteractionKind::Feeding
        } else if b_alone && !b_after_a {
            InteractionKind::Bleeding
        } else if a_then_b != b_then_a {
            if !a_alone && a_after_b {
                InteractionKind::Counterfeeding
            } else if a_alone && !a_after_b {
                InteractionKind::Counterbleeding
            } else {
                InteractionKind::Feeding
            }
        } else {
            InteractionKind::Independent
        }
    }
}

/// `# sounds(A) #`, `# sounds(B) #` and `# sounds(A) sounds(B) #`, skipping
/// empty and repeated probes.
fn default_probes(a: &Rule, b: &Rule) -> Vec<Sequence> {
    let sounds_a = literal_sounds(&a.ante);
    let sounds_b = literal_sounds(&b.ante);
    let combined: Vec<Element> = sounds_a.iter().chain(&sounds_b).cloned().collect();

    let mut probes: Vec<Sequence> = Vec::with_capacity(3);
    for sounds in [sounds_a, sounds_b, combined] {
        if sounds.is_empty() {
            continue;
        }
        let probe = Sequence::from(sounds).wrapped();
        if !probes.contains(&probe) {
            probes.push(probe);
        }
    }
    probes
}

fn literal_sounds(tokens: &[Token]) -> Vec<Element> {
    fn collect(token: &Token, out: &mut Vec<Element>) {
        match token {
            Token::Segment(sound) if !sound.partial => out.push(Element::Sound(sound.clone())),
            Token::Choice(alternatives) | Token::Set(alternatives) => {
                alternatives.iter().for_each(|alt| collect(alt, out));
            }
            Token::Quantified { inner, .. } => collect(inner, out),
            _ => {}
        }
    }

    let mut out = Vec::new();
    tokens.iter().for_each(|token| collect(token, &mut out));
    out
}

/// Human-readable advice for every non-independent pair, followed by a
/// `Suggested order: …` line when the feeding and bleeding constraints
/// admit a total order over every rule mentioned.
pub fn recommend_ordering(interactions: &[Interaction]) -> Vec<String> {
    let mut lines: Vec<String> = interactions.iter().filter_map(describe).collect();
    if let Some(order) = suggested_order(interactions) {
        lines.push(format!("Suggested order: {}", order.join(" → ")));
    }
    lines
}

fn describe(interaction: &Interaction) -> Option<String> {
    let a = &interaction.first.source;
    let b = &interaction.second.source;
    let advice = match interaction.kind {
        InteractionKind::Feeding => format!("'{a}' feeds '{b}': apply '{a}' before '{b}'"),
        InteractionKind::Bleeding => {
            format!("'{a}' bleeds '{b}': applying '{a}' first removes contexts '{b}' needs")
        }
        InteractionKind::Counterfeeding => {
            format!("'{a}' counterfeeds '{b}': '{b}' would create contexts for '{a}' if applied first")
        }
        InteractionKind::Counterbleeding => {
            format!("'{a}' counterbleeds '{b}': '{b}' would remove contexts of '{a}' if applied first")
        }
        InteractionKind::Independent => return None,
    };
    Some(match &interaction.example {
        Some(example) => format!("{advice} (e.g. {example})"),
        None => advice,
    })
}

/// Kahn's algorithm over the must-precede graph; ready rules are taken in
/// lexical order of their source. `None` when there is no constraint or the
/// constraints are cyclic.
fn suggested_order(interactions: &[Interaction]) -> Option<Vec<&str>> {
    let mut nodes: BTreeSet<&str> = BTreeSet::new();
    let mut edges: BTreeSet<(&str, &str)> = BTreeSet::new();
    for interaction in interactions {
        let a = interaction.first.source.as_str();
        let b = interaction.second.source.as_str();
        nodes.insert(a);
        nodes.insert(b);
        if interaction.kind.requires_precedence() && a != b {
            edges.insert((a, b));
        }
    }
    if edges.is_empty() {
        return None;
    }

    let mut in_degree: BTreeMap<&str, usize> = nodes.iter().map(|&n| (n, 0)).collect();
    let mut successors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &(from, to) in &edges {
        *in_degree.entry(to).or_default() += 1;
        successors.entry(from).or_default().push(to);
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(&node, _)| node)
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);
        for &next in successors.get(node).map(Vec::as_slice).unwrap_or_default() {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(next);
                }
            }
        }
    }

    (order.len() == nodes.len()).then_some(order)
}
