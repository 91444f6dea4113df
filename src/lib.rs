#![doc = include_str!("../README.md")]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The pipeline runs in two independent passes over the same compiled
//! artifact:
//!
//! 1. [`compile`](builder::compile) instantiates a [`Template`](builder::Template)
//!    with its compile-time parameters, unrolling the full component tree into
//!    an [`R1cs`](r1cs::R1cs) plus one witness computation rule per non-input
//!    signal.
//! 2. [`CompiledCircuit::witness`](builder::CompiledCircuit::witness) evaluates
//!    those rules against a concrete [`Inputs`](witness::Inputs) map and
//!    re-checks every constraint row.
//!
//! The core components are:
//! - [`Expression`](expr::Expression): degree-tracked expression algebra
//! - [`Scope`](builder::Scope): template instantiation and constraint emission
//! - [`R1cs`](r1cs::R1cs): the compiled constraint matrices
//! - [`Witness`](witness::Witness): the per-instance assignment vector
//! - [`gadgets`]: selection/branch patterns built on the above

use std::fmt::{self, Display, Formatter};

use ark_ff::PrimeField;

pub mod builder;
pub mod error;
pub mod expr;
pub mod gadgets;
pub mod hint;
pub mod matrix;
pub mod r1cs;
pub mod witness;

pub use builder::{compile, CompiledCircuit, Scope, Template};
pub use error::{CircuitError, Result};
pub use expr::Expression;
pub use r1cs::R1cs;
pub use witness::{Inputs, Witness};

#[cfg(test)]
mod mock {
  //! Test utilities including simple finite field implementations.
  use ark_ff::{Fp, MontBackend, MontConfig};

  #[allow(unexpected_cfgs)]
  #[derive(MontConfig)]
  #[modulus = "17"]
  #[generator = "3"]
  pub struct F17Config;
  /// A finite field of order 17 used for testing.
  pub type F17 = Fp<MontBackend<F17Config, 1>, 1>;

  #[allow(unexpected_cfgs)]
  #[derive(MontConfig)]
  #[modulus = "1009"]
  #[generator = "11"]
  pub struct F1009Config;
  /// A finite field of order 1009, for gadget tests that outgrow `F17`.
  pub type F1009 = Fp<MontBackend<F1009Config, 1>, 1>;
}
