//! Error types shared across compilation and witness evaluation.
//!
//! Compile-time errors abort compilation entirely; there is no partial
//! compiled artifact. Evaluation-time errors abort the single evaluation
//! that raised them and never touch the shared compiled circuit.

/// Errors raised while compiling a template or evaluating a witness.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CircuitError {
  /// An expression combination exceeded the quadratic limit: either its
  /// structural degree is above 2, or it would need more than one
  /// signal-signal product in a single constraint row.
  #[error("expression exceeds the quadratic constraint limit (degree {degree})")]
  DegreeExceeded {
    /// Structural degree of the offending expression.
    degree: usize,
  },

  /// Division by an expression of signal degree > 0. No constraint
  /// translation exists for signal-by-signal division.
  #[error("cannot divide by a signal-dependent expression")]
  DivisionBySignal,

  /// Division by the constant zero, rejected at compile time, or a strict
  /// inverse hint applied to zero at evaluation time.
  #[error("division by zero")]
  DivisionByZero,

  /// A host-only operation (`%`, shifts, comparisons) was applied to a
  /// value derived from a signal.
  #[error("operation `{op}` is not defined for signal-derived values")]
  UnsupportedOnSignal {
    /// The attempted operation.
    op: &'static str,
  },

  /// A loop bound, array size, or branch condition depends on a value that
  /// is not known at compile time.
  #[error("control structure depends on a value not known at compile time")]
  StaticityViolation,

  /// A second computation rule was recorded for an already-assigned signal.
  #[error("signal `{path}` is already assigned")]
  AlreadyAssigned {
    /// Full symbol path of the signal.
    path: String,
  },

  /// A required input signal has no value in the input map.
  #[error("missing value for input signal `{path}`")]
  MissingInput {
    /// Full symbol path of the signal.
    path: String,
  },

  /// The input map names a signal that is not an externally-supplied input.
  #[error("`{path}` is not an input signal of this circuit")]
  UnknownInput {
    /// The offending input map key.
    path: String,
  },

  /// A non-input signal reached evaluation with no computation rule.
  #[error("signal `{path}` is never assigned")]
  Unassigned {
    /// Full symbol path of the signal.
    path: String,
  },

  /// A witness vector failed an R1CS row. This signals a bug in a
  /// computation rule, not bad user input: rules and constraints are
  /// emitted together and must agree.
  #[error("constraint row {row} is not satisfied")]
  ConstraintUnsatisfied {
    /// Index of the first failing row, in emission order.
    row: usize,
  },

  /// A template was instantiated with unusable compile-time parameters.
  #[error("invalid template configuration: {0}")]
  InvalidConfig(String),

  /// An assignment or hint target was not a plain signal reference.
  #[error("expected a signal reference")]
  NotASignal,

  /// A component port lookup used a name the component never declared.
  #[error("component `{component}` has no signal `{name}`")]
  UnknownSignal {
    /// Instance path of the component.
    component: String,
    /// The requested local signal name.
    name:      String,
  },

  /// Computation rules formed a dependency cycle. Well-formed templates
  /// cannot produce one; hints that read later-assigned signals can.
  #[error("computation rules form a cycle involving `{path}`")]
  RuleCycle {
    /// A signal on the detected cycle.
    path: String,
  },
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, CircuitError>;
