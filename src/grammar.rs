//! The L-System rewriting engine.
//!
//! A [`GrammarDefinition`] is the plain-data description of a grammar (what an
//! editor or a JSON file provides). [`LSystem`] validates and compiles it once,
//! then rewrites its symbol state one generation per [`LSystem::grow`] call.

use crate::choice::WeightedChoice;
use crate::command::{self, DrawCommand, ResourceCounts};
use crate::error::ConfigError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

/// One weighted replacement alternative of a production rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Production {
    /// Symbols that replace the rewritten symbol. May be empty (prune).
    pub replacement: String,
    /// Relative, non-negative selection weight.
    pub weight: f64,
}

impl Production {
    pub fn new(replacement: impl Into<String>, weight: f64) -> Self {
        Self {
            replacement: replacement.into(),
            weight,
        }
    }
}

/// Plain-data description of a grammar.
///
/// ```
/// use symbios_sprout::GrammarDefinition;
///
/// let tree = GrammarDefinition::new("0")
///     .draw('0', "move 1")
///     .draw('1', "move 1")
///     .draw('[', "saveState; turnLeft 45")
///     .draw(']', "restoreState; turnRight 45")
///     .production('0', "1[0]0", 1.0)
///     .production('1', "11", 1.0)
///     .max_generation(6);
/// assert_eq!(tree.axiom, "0");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarDefinition {
    /// Draw-command string per symbol. Symbols without one are never drawn.
    pub draw_rules: BTreeMap<char, String>,
    /// Weighted alternatives per symbol. Symbols without any are copied unchanged.
    pub production_rules: BTreeMap<char, Vec<Production>>,
    /// Generation-0 state.
    pub axiom: String,
    /// Growth bound; `None` grows without limit.
    pub max_generation: Option<u32>,
}

impl GrammarDefinition {
    /// An empty grammar seeded with `axiom`.
    pub fn new(axiom: impl Into<String>) -> Self {
        Self {
            axiom: axiom.into(),
            ..Default::default()
        }
    }

    /// Sets the draw-command string of `symbol`.
    pub fn draw(mut self, symbol: char, command: impl Into<String>) -> Self {
        self.draw_rules.insert(symbol, command.into());
        self
    }

    /// Adds one alternative to `symbol`'s production rule.
    pub fn production(
        mut self,
        symbol: char,
        replacement: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.production_rules
            .entry(symbol)
            .or_default()
            .push(Production::new(replacement, weight));
        self
    }

    /// Bounds growth to `max` generations.
    pub fn max_generation(mut self, max: u32) -> Self {
        self.max_generation = Some(max);
        self
    }
}

fn counts_of(draw_rules: &HashMap<char, DrawCommand>, symbols: &[char]) -> ResourceCounts {
    symbols
        .iter()
        .filter_map(|s| draw_rules.get(s))
        .map(DrawCommand::resource_counts)
        .sum()
}

/// A compiled, growing L-System.
///
/// The random source is owned by the instance and used only for symbols with
/// more than one alternative.
pub struct LSystem<R = ChaCha8Rng> {
    draw_rules: HashMap<char, DrawCommand>,
    production_rules: HashMap<char, WeightedChoice<Vec<char>>>,
    axiom: Vec<char>,
    state: Vec<char>,
    generation: u32,
    max_generation: Option<u32>,
    counts: ResourceCounts,
    rng: R,
}

impl LSystem<ChaCha8Rng> {
    /// Compiles `definition` with an entropy-seeded random source.
    pub fn new(definition: &GrammarDefinition) -> Result<Self, ConfigError> {
        Self::with_rng(definition, ChaCha8Rng::from_entropy())
    }

    /// Compiles `definition` with a reproducible random source.
    pub fn seeded(definition: &GrammarDefinition, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(definition, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> LSystem<R> {
    /// Compiles every draw rule and validates every production rule.
    ///
    /// Fails on the first malformed command string or invalid weight set.
    /// A symbol without a draw rule is legal, as is a symbol whose production
    /// list is empty (it behaves as if it had no rule).
    pub fn with_rng(definition: &GrammarDefinition, rng: R) -> Result<Self, ConfigError> {
        let mut draw_rules = HashMap::with_capacity(definition.draw_rules.len());
        for (&symbol, source) in &definition.draw_rules {
            let compiled = command::compile(source)
                .map_err(|source| ConfigError::Command { symbol, source })?;
            draw_rules.insert(symbol, compiled);
        }

        let mut production_rules = HashMap::with_capacity(definition.production_rules.len());
        for (&symbol, alternatives) in &definition.production_rules {
            if alternatives.is_empty() {
                debug!(%symbol, "empty production list, symbol treated as literal");
                continue;
            }
            let choice = WeightedChoice::new(
                alternatives
                    .iter()
                    .map(|p| (p.replacement.chars().collect::<Vec<_>>(), p.weight)),
            )
            .map_err(|source| ConfigError::Production { symbol, source })?;
            production_rules.insert(symbol, choice);
        }

        let axiom: Vec<char> = definition.axiom.chars().collect();
        let counts = counts_of(&draw_rules, &axiom);

        debug!(
            draw_rules = draw_rules.len(),
            production_rules = production_rules.len(),
            axiom = %definition.axiom,
            max_generation = ?definition.max_generation,
            "compiled grammar"
        );

        Ok(Self {
            draw_rules,
            production_rules,
            state: axiom.clone(),
            axiom,
            generation: 0,
            max_generation: definition.max_generation,
            counts,
            rng,
        })
    }

    /// Rewrites the state into the next generation.
    ///
    /// Returns `false` without touching the state once the generation bound
    /// has been reached, or once the generation counter cannot advance.
    pub fn grow(&mut self) -> bool {
        if self.is_exhausted() {
            debug!(generation = self.generation, "growth bound reached");
            return false;
        }
        let Some(generation) = self.generation.checked_add(1) else {
            debug!(generation = self.generation, "generation counter saturated");
            return false;
        };

        let mut next = Vec::with_capacity(self.state.len());
        for &symbol in &self.state {
            match self.production_rules.get(&symbol) {
                Some(choice) => {
                    let replacement = match choice.only() {
                        Some(only) => only,
                        None => choice.choose(&mut self.rng),
                    };
                    next.extend_from_slice(replacement);
                }
                None => next.push(symbol),
            }
        }

        self.counts = counts_of(&self.draw_rules, &next);
        self.state = next;
        self.generation = generation;

        debug!(
            generation = self.generation,
            len = self.state.len(),
            lines = self.counts.lines,
            points = self.counts.points,
            "grew"
        );
        true
    }

    /// Grows up to `generations` times, returning how many steps succeeded.
    pub fn grow_by(&mut self, generations: u32) -> u32 {
        let mut grown = 0;
        while grown < generations && self.grow() {
            grown += 1;
        }
        grown
    }
}

impl<R> LSystem<R> {
    /// The current generation's symbol sequence.
    pub fn state(&self) -> &[char] {
        &self.state
    }

    /// Generations applied since the axiom.
    pub fn age(&self) -> u32 {
        self.generation
    }

    /// The generation-0 sequence.
    pub fn axiom(&self) -> &[char] {
        &self.axiom
    }

    pub fn max_generation(&self) -> Option<u32> {
        self.max_generation
    }

    /// `true` once [`grow`](Self::grow) can no longer advance.
    pub fn is_exhausted(&self) -> bool {
        self.max_generation.is_some_and(|max| self.generation >= max)
    }

    /// Compiled draw command of `symbol`, if it has one.
    pub fn draw_command(&self, symbol: char) -> Option<&DrawCommand> {
        self.draw_rules.get(&symbol)
    }

    /// `true` when `symbol` is rewritten rather than copied.
    pub fn has_production(&self, symbol: char) -> bool {
        self.production_rules.contains_key(&symbol)
    }

    /// Geometry one render pass of the current state will emit.
    pub fn resource_counts(&self) -> ResourceCounts {
        self.counts
    }

    /// Draw commands of the current state in sequence order, skipping
    /// symbols that have none.
    pub fn draw_sequence(&self) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.state.iter().filter_map(|s| self.draw_rules.get(s))
    }
}

impl<R> fmt::Display for LSystem<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

impl<R> fmt::Debug for LSystem<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LSystem")
            .field("generation", &self.generation)
            .field("max_generation", &self.max_generation)
            .field("state", &self.to_string())
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}
