//! Selection and branching patterns for fixed-topology circuits.
//!
//! A compiled circuit has no runtime indexing and no runtime control flow:
//! every constraint exists for every instance. These templates are the
//! standard substitutes: boolean indicators for conditions, indicator-
//! weighted inner products for selection, and full unroll-then-select for
//! data-dependent iteration. They are ordinary
//! [`Template`]s built on the instantiation engine, not a separate
//! evaluation path.

use super::*;
use crate::{
  builder::{Scope, Template},
  error::{CircuitError, Result},
  expr::Expression,
  hint::{BitOf, Inverse, InverseOrZero},
};

pub mod bits;
pub mod branch;
pub mod cmp;
pub mod mux;
pub mod sequence;
pub mod swap;

pub use bits::{LessThan, Num2Bits};
pub use branch::NWayBranch;
pub use cmp::{IsEqual, IsZero, MulInv};
pub use mux::QuinSelector;
pub use sequence::BoundedFactorial;
pub use swap::ArraySwap;

/// `2^k` as a field element.
pub(crate) fn pow_of_two<F: PrimeField>(k: usize) -> F {
  let mut pow = F::ONE;
  for _ in 0..k {
    pow = pow.double();
  }
  pow
}
