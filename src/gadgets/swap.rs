//! Simulated array mutation: rebuild with indicator-weighted branches.

use super::*;

/// Exchanges positions `s` and `t` of an `n`-entry array, both indices
/// signal-valued, producing a fresh output array.
///
/// Signals are immutable and not indexable by a signal, so the swap
/// rebuilds every position as a three-way branch: position `s` takes the
/// old `t` entry, position `t` the old `s` entry, everything else keeps
/// its own entry. When `s == t` the first two branches both fire on the
/// same position, so the `s`-branch is gated by `1 - (s == t)` to avoid
/// counting the exchanged entry twice.
///
/// This is the general shape of any simulated mutable memory: the "write"
/// allocates a new sequence computed entirely from indicator-weighted
/// combinations of the previous one.
#[derive(Clone, Copy, Debug)]
pub struct ArraySwap {
  /// Array length.
  pub n: usize,
}

impl<F: PrimeField> Template<F> for ArraySwap {
  fn name(&self) -> &str {
    "array_swap"
  }

  fn build(&self, cx: &mut Scope<'_, F>) -> Result<()> {
    let entries = cx.input_array("in", self.n)?;
    let s = cx.input("s")?;
    let t = cx.input("t")?;
    let out = cx.output_array("out", self.n)?;

    // The two runtime lookups, each its own selector instance.
    let at_s = cx.component("at_s", &QuinSelector { n: self.n })?;
    let at_t = cx.component("at_t", &QuinSelector { n: self.n })?;
    for (i, entry) in entries.iter().enumerate() {
      cx.assign(&at_s.input_at("in", i)?, entry.clone())?;
      cx.assign(&at_t.input_at("in", i)?, entry.clone())?;
    }
    cx.assign(&at_s.input("idx")?, s.clone())?;
    cx.assign(&at_t.input("idx")?, t.clone())?;
    let entry_at_s = at_s.output::<F>("out")?;
    let entry_at_t = at_t.output::<F>("out")?;

    // Equal-indices correction indicator.
    let same = cx.component("same", &IsZero)?;
    cx.assign(&same.input("in")?, s.clone() - t.clone())?;
    let equal_indices = same.output::<F>("out")?;

    let from_t = cx.intermediate_array("from_t", self.n)?;
    let from_s = cx.intermediate_array("from_s", self.n)?;
    let keep_indicator = cx.intermediate_array("keep_ind", self.n)?;
    let kept = cx.intermediate_array("kept", self.n)?;

    let mut at_position_s = cx.components("is_s", self.n);
    let mut at_position_t = cx.components("is_t", self.n);
    for i in 0..self.n {
      let position = Expression::constant(F::from(i as u64));

      let is_s = at_position_s.set(cx, i, &IsZero)?;
      cx.assign(&is_s.input("in")?, s.clone() - position.clone())?;
      let here_s = is_s.output::<F>("out")?;

      let is_t = at_position_t.set(cx, i, &IsZero)?;
      cx.assign(&is_t.input("in")?, t.clone() - position)?;
      let here_t = is_t.output::<F>("out")?;

      cx.assign(&from_t[i], here_s.clone() * entry_at_t.clone())?;
      cx.assign(&from_s[i], here_t.clone() * entry_at_s.clone())?;
      cx.assign(
        &keep_indicator[i],
        (Expression::one() - here_s) * (Expression::one() - here_t),
      )?;
      cx.assign(&kept[i], keep_indicator[i].clone() * entries[i].clone())?;

      // One product per row: the correction gate multiplies the already-
      // materialized `from_t` branch.
      cx.assign(
        &out[i],
        (Expression::one() - equal_indices.clone()) * from_t[i].clone()
          + from_s[i].clone()
          + kept[i].clone(),
      )?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{builder::compile, mock::F1009, witness::Inputs};

  const ENTRIES: [u64; 4] = [5, 6, 7, 8];

  fn swapped(s: u64, t: u64) -> Vec<F1009> {
    let circuit = compile::<F1009>(&ArraySwap { n: 4 }).unwrap();
    let mut inputs = Inputs::new();
    for (i, v) in ENTRIES.into_iter().enumerate() {
      inputs.set_u64(&format!("in[{i}]"), v);
    }
    inputs.set_u64("s", s).set_u64("t", t);
    let witness = circuit.witness(&inputs).unwrap();
    (0..4)
      .map(|i| witness.value(circuit.witness_column(&format!("out[{i}]")).unwrap()))
      .collect()
  }

  fn as_field(values: [u64; 4]) -> Vec<F1009> {
    values.into_iter().map(F1009::from).collect()
  }

  #[test]
  fn distinct_indices_exchange_exactly_two_positions() {
    assert_eq!(swapped(1, 3), as_field([5, 8, 7, 6]));
    assert_eq!(swapped(3, 1), as_field([5, 8, 7, 6]));
    assert_eq!(swapped(0, 1), as_field([6, 5, 7, 8]));
  }

  #[test]
  fn equal_indices_leave_the_array_untouched() {
    // The correction term keeps the doubled branch out: out[s] must be
    // the original entry, not twice it.
    for i in 0..4 {
      assert_eq!(swapped(i, i), as_field(ENTRIES));
    }
  }
}
