// Context-free string rewriting (L-systems).
//
// An `LSystem` maps single symbols to replacement strings. One rewriting pass
// walks the input left to right and emits, for each symbol, either its
// production or the symbol itself when it has none. Output of a pass is never
// re-scanned within the same pass, so the result depends only on the rule
// set, the axiom and the iteration count.
//
// A deterministic system refuses two productions for the same symbol at
// construction time. `StochasticLSystem` is the relaxed variant: several
// productions per symbol, one picked uniformly per occurrence from a
// `SeededRng`, so it is still reproducible given a seed.
//
// Strings grow geometrically with the iteration count. `run_bounded` is the
// guarded entry point for callers that take the count from user input.

use crate::error::{Result, RhythmError};
use chorale_prng::SeededRng;
use std::collections::BTreeMap;
use tracing::debug;

/// A single rewriting rule `symbol -> replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub symbol: char,
    pub replacement: String,
}

impl Production {
    pub fn new(symbol: char, replacement: impl Into<String>) -> Self {
        Production {
            symbol,
            replacement: replacement.into(),
        }
    }

    /// Build a production from a string base, which must be exactly one symbol.
    pub fn parse(base: &str, replacement: impl Into<String>) -> Result<Self> {
        let mut chars = base.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Ok(Production::new(symbol, replacement)),
            _ => Err(RhythmError::InvalidSymbol {
                base: base.to_string(),
            }),
        }
    }
}

/// A deterministic L-system: at most one production per symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LSystem {
    rules: BTreeMap<char, String>,
}

impl LSystem {
    /// Build a system, rejecting any symbol given two productions.
    pub fn new(productions: impl IntoIterator<Item = Production>) -> Result<Self> {
        let mut rules = BTreeMap::new();
        for p in productions {
            if rules.insert(p.symbol, p.replacement).is_some() {
                return Err(RhythmError::DuplicateProduction { symbol: p.symbol });
            }
        }
        Ok(LSystem { rules })
    }

    /// Convenience constructor from `(base, replacement)` string pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let productions = pairs
            .iter()
            .map(|&(base, replacement)| Production::parse(base, replacement))
            .collect::<Result<Vec<_>>>()?;
        LSystem::new(productions)
    }

    pub fn production(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One simultaneous rewriting pass.
    pub fn rewrite(&self, input: &str) -> String {
        self.rewrite_with(input, false)
    }

    /// One pass with each applied production wrapped in `<` `>`, for
    /// inspecting how the string was derived.
    pub fn rewrite_annotated(&self, input: &str) -> String {
        self.rewrite_with(input, true)
    }

    fn rewrite_with(&self, input: &str, annotate: bool) -> String {
        let mut out = String::with_capacity(input.len() * 2);
        for c in input.chars() {
            match self.rules.get(&c) {
                Some(replacement) => {
                    if annotate {
                        out.push('<');
                    }
                    out.push_str(replacement);
                    if annotate {
                        out.push('>');
                    }
                }
                None => out.push(c),
            }
        }
        out
    }

    /// Apply `iterations` passes to `initial`. Zero iterations is the identity.
    pub fn run(&self, initial: &str, iterations: usize) -> String {
        let mut current = initial.to_string();
        for _ in 0..iterations {
            current = self.rewrite(&current);
        }
        debug!(iterations, len = current.len(), "l-system run");
        current
    }

    /// Like `run`, with annotation markers around every replacement.
    pub fn run_annotated(&self, initial: &str, iterations: usize) -> String {
        let mut current = initial.to_string();
        for _ in 0..iterations {
            current = self.rewrite_annotated(&current);
        }
        current
    }

    /// Like `run`, but fails once the string grows past `max_len` symbols.
    pub fn run_bounded(&self, initial: &str, iterations: usize, max_len: usize) -> Result<String> {
        let mut current = initial.to_string();
        for iteration in 1..=iterations {
            current = self.rewrite(&current);
            if current.chars().count() > max_len {
                return Err(RhythmError::LengthLimit {
                    limit: max_len,
                    iteration,
                });
            }
        }
        debug!(iterations, len = current.len(), "bounded l-system run");
        Ok(current)
    }
}

/// An L-system allowing several productions per symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StochasticLSystem {
    rules: BTreeMap<char, Vec<String>>,
}

impl StochasticLSystem {
    pub fn new(productions: impl IntoIterator<Item = Production>) -> Self {
        let mut rules: BTreeMap<char, Vec<String>> = BTreeMap::new();
        for p in productions {
            rules.entry(p.symbol).or_default().push(p.replacement);
        }
        StochasticLSystem { rules }
    }

    /// Number of alternatives registered for `symbol`.
    pub fn alternatives(&self, symbol: char) -> usize {
        self.rules.get(&symbol).map_or(0, Vec::len)
    }

    /// One pass; each occurrence of a symbol picks its own production.
    pub fn rewrite(&self, input: &str, rng: &mut SeededRng) -> String {
        let mut out = String::with_capacity(input.len() * 2);
        for c in input.chars() {
            match self.rules.get(&c).and_then(|options| rng.choose(options)) {
                Some(replacement) => out.push_str(replacement),
                None => out.push(c),
            }
        }
        out
    }

    pub fn run(&self, initial: &str, iterations: usize, rng: &mut SeededRng) -> String {
        let mut current = initial.to_string();
        for _ in 0..iterations {
            current = self.rewrite(&current, rng);
        }
        current
    }
}
