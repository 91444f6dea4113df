//! Witness evaluation: from concrete inputs to a checked assignment vector.
//!
//! Evaluation is a pure function of the compiled circuit and the input
//! map. The compiled circuit is never mutated, so independent instances
//! may evaluate concurrently against one shared compilation.

use std::collections::{BTreeMap, VecDeque};

use super::*;
use crate::{
  builder::{CompiledCircuit, Rule, SignalKind},
  error::{CircuitError, Result},
  expr::Expression,
};

/// Input values keyed by full signal path.
///
/// Values are field elements; the byte-level entry point reduces
/// arbitrary-precision integers modulo the field order, which is the one
/// documented policy for out-of-range inputs.
#[derive(Clone, Debug, Default)]
pub struct Inputs<F: PrimeField> {
  /// Supplied values by signal path.
  values: BTreeMap<String, F>,
}

impl<F: PrimeField> Inputs<F> {
  /// An empty input map.
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets an input to a field element.
  pub fn set(&mut self, path: &str, value: F) -> &mut Self {
    self.values.insert(path.to_string(), value);
    self
  }

  /// Sets an input from a small integer.
  pub fn set_u64(&mut self, path: &str, value: u64) -> &mut Self {
    self.set(path, F::from(value))
  }

  /// Sets an input from a little-endian arbitrary-precision integer,
  /// reduced modulo the field order.
  pub fn set_bytes_le(&mut self, path: &str, bytes: &[u8]) -> &mut Self {
    self.set(path, F::from_le_bytes_mod_order(bytes))
  }

  /// The supplied value for `path`, if any.
  pub fn get(&self, path: &str) -> Option<F> {
    self.values.get(path).copied()
  }
}

/// The assignment vector of one proof instance.
///
/// Position 0 is the constant `1`; every other position is the value of
/// exactly one signal, immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness<F: PrimeField> {
  /// The vector, constant entry included.
  values: Vec<F>,
}

impl<F: PrimeField> Witness<F> {
  /// The full vector, constant entry included.
  pub fn values(&self) -> &[F] {
    &self.values
  }

  /// The value at a witness column (as reported by the symbol boundary).
  pub fn value(&self, column: usize) -> F {
    self.values[column]
  }
}

/// Evaluates one signal's `Assign` rule expression over the vector so far.
fn eval_expr<F: PrimeField>(expr: &Expression<F>, values: &[F]) -> F {
  match expr {
    Expression::Constant(c) => *c,
    Expression::Signal(id) => values[id.witness_column()],
    Expression::Add(terms) => terms.iter().map(|term| eval_expr(term, values)).sum(),
    Expression::Mul(factors) => {
      factors.iter().fold(F::ONE, |acc, factor| acc * eval_expr(factor, values))
    },
  }
}

impl<F: PrimeField> CompiledCircuit<F> {
  /// Evaluates a witness vector for one set of inputs.
  ///
  /// Signals are computed in dependency order, then every constraint row
  /// is re-checked against the finished vector; a failing row means a
  /// computation rule and its constraint disagree and is reported as
  /// [`CircuitError::ConstraintUnsatisfied`], never silently accepted.
  /// This is the only validation performed: in particular no range
  /// checking happens beyond what the circuit itself constrains.
  pub fn witness(&self, inputs: &Inputs<F>) -> Result<Witness<F>> {
    let num_signals = self.signals.len();
    let mut values = vec![F::ZERO; num_signals + 1];
    values[0] = F::ONE;

    // Every rule-less signal must be an externally supplied input.
    let mut required: BTreeMap<String, usize> = BTreeMap::new();
    for (i, info) in self.signals.iter().enumerate() {
      if self.rules[i].is_none() {
        if info.kind != SignalKind::Input {
          return Err(CircuitError::Unassigned { path: info.path() });
        }
        required.insert(info.path(), i);
      }
    }

    for path in inputs.values.keys() {
      if !required.contains_key(path) {
        return Err(CircuitError::UnknownInput { path: path.clone() });
      }
    }

    let mut resolved = vec![false; num_signals];
    for (path, &i) in &required {
      let value = inputs.get(path).ok_or_else(|| CircuitError::MissingInput { path: path.clone() })?;
      values[i + 1] = value;
      resolved[i] = true;
    }

    // Kahn's algorithm over the rule read-sets.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); num_signals];
    let mut pending = vec![0usize; num_signals];
    for (i, rule) in self.rules.iter().enumerate() {
      if let Some(rule) = rule {
        for read in rule.reads() {
          if !resolved[read.0] {
            dependents[read.0].push(i);
            pending[i] += 1;
          }
        }
      }
    }

    let mut ready: VecDeque<usize> = (0..num_signals)
      .filter(|&i| self.rules[i].is_some() && pending[i] == 0)
      .collect();
    let mut evaluated = 0usize;

    while let Some(i) = ready.pop_front() {
      let value = match self.rules[i].as_ref() {
        Some(Rule::Assign(expr)) => eval_expr(expr, &values),
        Some(Rule::Hint { hint, reads }) => {
          let read_values: Vec<F> = reads.iter().map(|r| values[r.witness_column()]).collect();
          hint.evaluate(&read_values)?
        },
        None => unreachable!("only ruled signals are queued"),
      };
      values[i + 1] = value;
      resolved[i] = true;
      evaluated += 1;

      for &dependent in &dependents[i] {
        pending[dependent] -= 1;
        if pending[dependent] == 0 {
          ready.push_back(dependent);
        }
      }
    }

    let ruled = self.rules.iter().filter(|rule| rule.is_some()).count();
    if evaluated < ruled {
      // Well-formed templates cannot get here; a hint reading a signal
      // that transitively reads it back can.
      let stuck = (0..num_signals)
        .find(|&i| self.rules[i].is_some() && !resolved[i])
        .map(|i| self.signals[i].path())
        .unwrap_or_default();
      return Err(CircuitError::RuleCycle { path: stuck });
    }

    self.r1cs.check(&values)?;
    Ok(Witness { values })
  }
}
