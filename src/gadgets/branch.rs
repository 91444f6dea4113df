//! N-way branch emulation over mutually exclusive indicators.

use std::collections::BTreeSet;

use super::*;

/// Selects one of `cases.len() + 1` branch values by comparing `sel`
/// against the compile-time case constants; the final value is the
/// catch-all "otherwise" branch.
///
/// Each explicit case gets an equality indicator against its own constant.
/// The constants must be distinct: that makes the indicators mutually
/// exclusive by construction, so their sum is 0 or 1 and the otherwise
/// indicator is simply `1 - Σ ind`. Overlapping cases would break that
/// derivation, so they are rejected at instantiation.
#[derive(Clone, Debug)]
pub struct NWayBranch {
  /// Case constants for the first `cases.len()` branch values.
  pub cases: Vec<u64>,
}

impl<F: PrimeField> Template<F> for NWayBranch {
  fn name(&self) -> &str {
    "n_way_branch"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    let distinct: BTreeSet<u64> = self.cases.iter().copied().collect();
    if distinct.len() != self.cases.len() {
      return Err(CircuitError::InvalidConfig("branch case constants overlap".into()));
    }

    let branches = self.cases.len() + 1;
    let sel = cx.input("sel")?;
    let values = cx.input_array("val", branches)?;
    let out = cx.output("out")?;
    let gated = cx.intermediate_array("gated", branches)?;
    let otherwise = cx.intermediate("otherwise")?;

    let mut indicators = cx.components("case", self.cases.len());
    let mut indicator_sum = Expression::zero();
    let mut total = Expression::zero();
    for (i, &case) in self.cases.iter().enumerate() {
      let eq = indicators.set(cx, i, &IsZero)?;
      cx.assign(&eq.input("in")?, sel.clone() - Expression::constant(F::from(case)))?;
      let indicator = eq.output::<F>("out")?;

      cx.assign(&gated[i], indicator.clone() * values[i].clone())?;
      indicator_sum = indicator_sum + indicator;
      total = total + gated[i].clone();
    }

    cx.assign(&otherwise, Expression::one() - indicator_sum)?;
    cx.assign(&gated[branches - 1], otherwise * values[branches - 1].clone())?;
    total = total + gated[branches - 1].clone();

    cx.assign(&out, total)
  }
}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use super::*;
  use crate::{builder::compile, mock::F1009, witness::Inputs};

  fn branch_on(sel: u64) -> F1009 {
    let circuit = compile::<F1009>(&NWayBranch { cases: vec![3, 5] }).unwrap();
    let mut inputs = Inputs::new();
    inputs
      .set_u64("sel", sel)
      .set_u64("val[0]", 10)
      .set_u64("val[1]", 20)
      .set_u64("val[2]", 30);
    let witness = circuit.witness(&inputs).unwrap();
    witness.value(circuit.witness_column("out").unwrap())
  }

  #[rstest]
  #[case(3, 10)]
  #[case(5, 20)]
  #[case(0, 30)]
  #[case(7, 30)]
  fn branches_route_to_the_matching_value(#[case] sel: u64, #[case] expected: u64) {
    assert_eq!(branch_on(sel), F1009::from(expected));
  }

  #[test]
  fn overlapping_cases_are_rejected() {
    assert!(matches!(
      compile::<F1009>(&NWayBranch { cases: vec![3, 3] }).unwrap_err(),
      CircuitError::InvalidConfig(_)
    ));
  }

  #[test]
  fn single_branch_degenerates_to_the_otherwise_value() {
    let circuit = compile::<F1009>(&NWayBranch { cases: Vec::new() }).unwrap();
    let mut inputs = Inputs::new();
    inputs.set_u64("sel", 42).set_u64("val[0]", 9);
    let witness = circuit.witness(&inputs).unwrap();
    assert_eq!(
      witness.value(circuit.witness_column("out").unwrap()),
      F1009::from(9)
    );
  }
}
