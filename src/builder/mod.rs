//! Template instantiation and constraint emission.
//!
//! A [`Template`] describes a parameterized circuit; [`compile`] unrolls it
//! eagerly into a [`CompiledCircuit`]. All structure (signal counts, loop
//! bounds, sub-component trees) is fixed by compile-time parameters before
//! any witness value exists, so no constraint's shape can depend on a
//! signal.
//!
//! Emission primitives:
//! - [`Scope::assign`] (`<==`): one constraint plus the witness rule,
//! - [`Scope::constrain`] (`===`): one constraint, no rule,
//! - [`Scope::hint`] (`<--`): witness rule only, no constraint.

use std::{collections::BTreeMap, sync::Arc};

use super::*;
use crate::{
  error::{CircuitError, Result},
  expr::{Expression, SignalId},
  hint::Hint,
  r1cs::{Constraint, LinearCombination, QuadraticForm, R1cs},
};

pub mod var;


pub use var::Var;

/// Kind of a declared signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
  /// Supplied externally (root) or wired by the instantiating scope.
  Input,
  /// Produced by a component and exposed to its instantiator.
  Output,
  /// Internal to the declaring component.
  Intermediate,
}

/// Metadata for one declared signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalInfo {
  /// The signal's kind.
  pub kind:      SignalKind,
  /// Instance path of the owning component; empty for the root.
  pub component: String,
  /// Local name within the component, including any array index.
  pub local:     String,
}

impl SignalInfo {
  /// Full symbol path, `component.local` with the root prefix elided.
  pub fn path(&self) -> String {
    if self.component.is_empty() {
      self.local.clone()
    } else {
      format!("{}.{}", self.component, self.local)
    }
  }
}

/// One entry of the symbol boundary: maps a human-readable signal path to
/// its witness-vector column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
  /// Full signal path.
  pub path:   String,
  /// Witness-vector column of the signal.
  pub column: usize,
  /// The signal's kind.
  pub kind:   SignalKind,
}

/// Witness computation rule for one signal.
#[derive(Clone)]
pub(crate) enum Rule<F: PrimeField> {
  /// Pure field evaluation of an expression (from constrain-and-assign).
  Assign(Expression<F>),
  /// Host computation over the named read signals (no constraint).
  Hint {
    /// The prover-side computation.
    hint:  Arc<dyn Hint<F>>,
    /// Signals the computation reads, in argument order.
    reads: Vec<SignalId>,
  },
}

impl<F: PrimeField> Rule<F> {
  /// Signals this rule reads.
  pub(crate) fn reads(&self) -> Vec<SignalId> {
    match self {
      Self::Assign(expr) => expr.signals().into_iter().collect(),
      Self::Hint { reads, .. } => reads.clone(),
    }
  }
}

impl<F: PrimeField> fmt::Debug for Rule<F> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Self::Assign(expr) => write!(f, "Assign({expr})"),
      Self::Hint { hint, reads } => write!(f, "Hint({}, reads {:?})", hint.name(), reads),
    }
  }
}

/// Non-fatal conditions surfaced by compilation.
///
/// Warnings are soundness hazards, not errors: they are surfaced for the
/// implementer and the test suite to act on, never auto-corrected, and
/// they do not block compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
  /// An Output signal of a non-root instance is never referenced by a
  /// constraint outside that instance, so nothing binds its value for the
  /// instantiator.
  DanglingOutput {
    /// Full path of the unconsumed output.
    path: String,
  },
}

/// A parameterized circuit description.
///
/// Compile-time parameters are ordinary struct fields; `build` declares
/// signals, wires sub-components, and emits constraints against the given
/// scope. Building must be deterministic in the parameters alone.
pub trait Template<F: PrimeField> {
  /// Template name, used for diagnostics.
  fn name(&self) -> &str;

  /// Declares signals and emits constraints into `cx`.
  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()>;
}

/// Accumulates signals, rules, and constraints across the component tree.
#[derive(Debug, Default)]
pub struct CircuitBuilder<F: PrimeField> {
  /// Declared signals in declaration order.
  signals:     Vec<SignalInfo>,
  /// Computation rule per signal, if recorded.
  rules:       Vec<Option<Rule<F>>>,
  /// Constraint rows in emission order.
  constraints: Vec<Constraint<F>>,
  /// Whether a constraint outside the owning instance references the
  /// signal; drives dangling-output detection.
  consumed:    Vec<bool>,
}

impl<F: PrimeField> CircuitBuilder<F> {
  /// Creates an empty builder.
  pub fn new() -> Self {
    Self::default()
  }

  /// The root scope, with an empty instance path.
  pub fn root(&mut self) -> Scope<'_, F> {
    Scope { builder: self, path: String::new(), ports: Vec::new() }
  }

  /// Finalizes into an immutable compiled circuit, computing warnings.
  pub fn build(self) -> CompiledCircuit<F> {
    let mut warnings = Vec::new();
    for (i, info) in self.signals.iter().enumerate() {
      // Root outputs are consumed by the external world.
      if info.kind == SignalKind::Output && !info.component.is_empty() && !self.consumed[i] {
        warnings.push(Warning::DanglingOutput { path: info.path() });
      }
    }

    let witness_len = self.signals.len() + 1;
    CompiledCircuit {
      r1cs: R1cs { constraints: self.constraints, witness_len },
      signals: self.signals,
      rules: self.rules,
      warnings,
    }
  }

  /// Records a computation rule, enforcing single assignment.
  fn record_rule(&mut self, id: SignalId, rule: Rule<F>) -> Result<()> {
    let slot = &mut self.rules[id.0];
    if slot.is_some() {
      return Err(CircuitError::AlreadyAssigned { path: self.signals[id.0].path() });
    }
    *slot = Some(rule);
    Ok(())
  }

  /// Appends a constraint row and updates consumption marks.
  ///
  /// `defined` names the signal this row assigns, which does not count as
  /// consuming it; every other referenced signal is consumed if the row
  /// was emitted outside the signal's owning instance.
  fn push_constraint(&mut self, constraint: Constraint<F>, emitted_in: &str, defined: Option<SignalId>) {
    let columns: Vec<usize> = constraint
      .a
      .signal_columns()
      .chain(constraint.b.signal_columns())
      .chain(constraint.c.signal_columns())
      .collect();
    for col in columns {
      let id = col - 1;
      if defined == Some(SignalId(id)) {
        continue;
      }
      if self.signals[id].component != emitted_in {
        self.consumed[id] = true;
      }
    }
    self.constraints.push(constraint);
  }
}

/// A component namespace during instantiation.
///
/// Every template body runs against a scope; sub-components get child
/// scopes with extended instance paths. Dropping the scope ends the
/// instance; instances are never re-entered.
pub struct Scope<'a, F: PrimeField> {
  /// The shared builder.
  builder: &'a mut CircuitBuilder<F>,
  /// Instance path; empty for the root.
  path:    String,
  /// Signals declared by this instance, in order.
  ports:   Vec<(String, SignalId, SignalKind)>,
}

impl<F: PrimeField> Scope<'_, F> {
  /// This instance's path (empty for the root).
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Declares one signal in this scope.
  fn declare(&mut self, local: String, kind: SignalKind) -> Result<Expression<F>> {
    if self.ports.iter().any(|(name, _, _)| *name == local) {
      return Err(CircuitError::InvalidConfig(format!(
        "signal `{local}` is declared twice in `{}`",
        if self.path.is_empty() { "the root" } else { &self.path }
      )));
    }
    let id = SignalId(self.builder.signals.len());
    self.builder.signals.push(SignalInfo {
      kind,
      component: self.path.clone(),
      local: local.clone(),
    });
    self.builder.rules.push(None);
    self.builder.consumed.push(false);
    self.ports.push((local, id, kind));
    Ok(Expression::Signal(id))
  }

  /// Declares an Input signal.
  pub fn input(&mut self, name: &str) -> Result<Expression<F>> {
    self.declare(name.to_string(), SignalKind::Input)
  }

  /// Declares an array of Input signals `name[0]..name[len-1]`.
  pub fn input_array(&mut self, name: &str, len: usize) -> Result<Vec<Expression<F>>> {
    (0..len).map(|i| self.declare(format!("{name}[{i}]"), SignalKind::Input)).collect()
  }

  /// Declares an Output signal.
  pub fn output(&mut self, name: &str) -> Result<Expression<F>> {
    self.declare(name.to_string(), SignalKind::Output)
  }

  /// Declares an array of Output signals.
  pub fn output_array(&mut self, name: &str, len: usize) -> Result<Vec<Expression<F>>> {
    (0..len).map(|i| self.declare(format!("{name}[{i}]"), SignalKind::Output)).collect()
  }

  /// Declares an Intermediate signal.
  pub fn intermediate(&mut self, name: &str) -> Result<Expression<F>> {
    self.declare(name.to_string(), SignalKind::Intermediate)
  }

  /// Declares an array of Intermediate signals.
  pub fn intermediate_array(&mut self, name: &str, len: usize) -> Result<Vec<Expression<F>>> {
    (0..len).map(|i| self.declare(format!("{name}[{i}]"), SignalKind::Intermediate)).collect()
  }

  /// Requires an expression to be a bare signal reference.
  fn expect_signal(expr: &Expression<F>) -> Result<SignalId> {
    match expr {
      Expression::Signal(id) => Ok(*id),
      _ => Err(CircuitError::NotASignal),
    }
  }

  /// Constrain-and-assign (`<==`): emits `target == expr` as one quadratic
  /// row and records `expr` as the target's witness rule.
  pub fn assign(&mut self, target: &Expression<F>, expr: Expression<F>) -> Result<()> {
    let id = Self::expect_signal(target)?;
    let form = QuadraticForm::from_expression(&expr)?;
    self.builder.record_rule(id, Rule::Assign(expr))?;

    let (a, b, c) = form.into_parts();
    let constraint = Constraint { a, b, c: LinearCombination::from_signal(id) - c };
    self.builder.push_constraint(constraint, &self.path, Some(id));
    Ok(())
  }

  /// Constrain-only (`===`): emits `lhs == rhs` as one quadratic row with
  /// no witness rule on either side.
  pub fn constrain(&mut self, lhs: Expression<F>, rhs: Expression<F>) -> Result<()> {
    let difference =
      QuadraticForm::from_expression(&lhs)?.sub(QuadraticForm::from_expression(&rhs)?)?;
    let (a, b, c) = difference.into_parts();
    // a*b + c = 0, so the row is a*b = -c.
    let constraint = Constraint { a, b, c: -c };
    self.builder.push_constraint(constraint, &self.path, None);
    Ok(())
  }

  /// Hint (`<--`): records a prover-side witness rule with no constraint.
  ///
  /// `reads` are the signals handed to the hint, in argument order. The
  /// caller is responsible for separately constraining the target; an
  /// unconstrained hint is exactly the soundness hazard the warnings
  /// machinery exists to surface.
  pub fn hint(
    &mut self,
    target: &Expression<F>,
    reads: &[&Expression<F>],
    hint: impl Hint<F> + 'static,
  ) -> Result<()> {
    let id = Self::expect_signal(target)?;
    let read_ids = reads.iter().map(|e| Self::expect_signal(e)).collect::<Result<Vec<_>>>()?;
    self.builder.record_rule(id, Rule::Hint { hint: Arc::new(hint), reads: read_ids })
  }

  /// Joins a child name onto this scope's path.
  fn join(&self, name: &str) -> String {
    if self.path.is_empty() {
      name.to_string()
    } else {
      format!("{}.{name}", self.path)
    }
  }

  /// Instantiates a sub-component eagerly under `name`.
  ///
  /// The child template runs to completion here; the returned handle
  /// exposes exactly its declared Input and Output ports.
  pub fn component(&mut self, name: &str, template: &dyn Template<F>) -> Result<ComponentHandle> {
    let path = self.join(name);
    let mut child = Scope { builder: &mut *self.builder, path: path.clone(), ports: Vec::new() };
    template.build(&mut child)?;
    let ports = std::mem::take(&mut child.ports);

    let mut inputs = BTreeMap::new();
    let mut outputs = BTreeMap::new();
    for (local, id, kind) in ports {
      match kind {
        SignalKind::Input => {
          inputs.insert(local, id);
        },
        SignalKind::Output => {
          outputs.insert(local, id);
        },
        SignalKind::Intermediate => {},
      }
    }
    Ok(ComponentHandle { path, inputs, outputs })
  }

  /// Pre-declares `len` instance slots for components created inside a
  /// loop, the supported idiom for "components in loops": the array size
  /// is fixed here, the template of each element is supplied during
  /// unrolling via [`ComponentSlots::set`].
  pub fn components(&mut self, name: &str, len: usize) -> ComponentSlots {
    ComponentSlots { name: name.to_string(), filled: vec![false; len] }
  }
}

/// Handle to an instantiated sub-component's declared ports.
#[derive(Clone, Debug)]
pub struct ComponentHandle {
  /// Instance path of the component.
  path:    String,
  /// Input ports by local name.
  inputs:  BTreeMap<String, SignalId>,
  /// Output ports by local name.
  outputs: BTreeMap<String, SignalId>,
}

impl ComponentHandle {
  /// Instance path of the component.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Looks up a port in one of the maps.
  fn lookup<F: PrimeField>(
    &self,
    ports: &BTreeMap<String, SignalId>,
    name: &str,
  ) -> Result<Expression<F>> {
    ports.get(name).map(|&id| Expression::Signal(id)).ok_or_else(|| CircuitError::UnknownSignal {
      component: self.path.clone(),
      name:      name.to_string(),
    })
  }

  /// An Input port by local name.
  pub fn input<F: PrimeField>(&self, name: &str) -> Result<Expression<F>> {
    self.lookup(&self.inputs, name)
  }

  /// An element of an Input port array.
  pub fn input_at<F: PrimeField>(&self, name: &str, index: usize) -> Result<Expression<F>> {
    self.lookup(&self.inputs, &format!("{name}[{index}]"))
  }

  /// An Output port by local name.
  pub fn output<F: PrimeField>(&self, name: &str) -> Result<Expression<F>> {
    self.lookup(&self.outputs, name)
  }

  /// An element of an Output port array.
  pub fn output_at<F: PrimeField>(&self, name: &str, index: usize) -> Result<Expression<F>> {
    self.lookup(&self.outputs, &format!("{name}[{index}]"))
  }
}

/// A compile-time-sized array of component instance slots.
///
/// Each slot is typed only when it is filled, so different iterations of
/// an unrolled loop may instantiate different templates.
#[derive(Debug)]
pub struct ComponentSlots {
  /// Base name for the slot paths `name[i]`.
  name:   String,
  /// Which slots have been instantiated.
  filled: Vec<bool>,
}

impl ComponentSlots {
  /// Instantiates `template` into slot `index` of the declaring scope.
  pub fn set<F: PrimeField>(
    &mut self,
    cx: &mut Scope<'_, F>,
    index: usize,
    template: &dyn Template<F>,
  ) -> Result<ComponentHandle> {
    if index >= self.filled.len() {
      return Err(CircuitError::InvalidConfig(format!(
        "slot index {index} out of bounds for `{}` of length {}",
        self.name,
        self.filled.len()
      )));
    }
    if self.filled[index] {
      return Err(CircuitError::InvalidConfig(format!(
        "slot `{}[{index}]` is already instantiated",
        self.name
      )));
    }
    self.filled[index] = true;
    cx.component(&format!("{}[{index}]", self.name), template)
  }
}

/// The immutable result of compilation: the R1CS, the per-signal rule
/// graph, the symbol table, and any warnings.
///
/// Shared freely across concurrent witness evaluations; nothing here is
/// mutated after compilation.
#[derive(Debug)]
pub struct CompiledCircuit<F: PrimeField> {
  /// The constraint system.
  pub(crate) r1cs:     R1cs<F>,
  /// Signal metadata in declaration order.
  pub(crate) signals:  Vec<SignalInfo>,
  /// Computation rule per signal.
  pub(crate) rules:    Vec<Option<Rule<F>>>,
  /// Warnings collected during compilation.
  pub(crate) warnings: Vec<Warning>,
}

impl<F: PrimeField> CompiledCircuit<F> {
  /// The compiled constraint system.
  pub fn r1cs(&self) -> &R1cs<F> {
    &self.r1cs
  }

  /// Warnings surfaced by compilation.
  pub fn warnings(&self) -> &[Warning] {
    &self.warnings
  }

  /// The symbol boundary: every signal's path, witness column, and kind.
  pub fn symbols(&self) -> Vec<Symbol> {
    self
      .signals
      .iter()
      .enumerate()
      .map(|(i, info)| Symbol { path: info.path(), column: i + 1, kind: info.kind })
      .collect()
  }

  /// Witness column of the signal at `path`, if declared.
  pub fn witness_column(&self, path: &str) -> Option<usize> {
    self.signals.iter().position(|info| info.path() == path).map(|i| i + 1)
  }
}

/// Compiles a template with its compile-time parameters already bound.
pub fn compile<F: PrimeField>(template: &dyn Template<F>) -> Result<CompiledCircuit<F>> {
  let mut builder = CircuitBuilder::new();
  let mut root = builder.root();
  template.build(&mut root)?;
  Ok(builder.build())
}
