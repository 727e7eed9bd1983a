//! Pearson correlation estimator, implemented through the raw-sums
//! accumulator (Σx, Σx², Σy, Σy², Σxy) so that prefix sums can be extended
//! incrementally instead of re-derived per hypothesis, the same shape as the
//! streaming `update`/`finalize` accumulators used by correlation-power-
//! analysis processors elsewhere in the Rust side-channel ecosystem.

use rayon::prelude::*;

use crate::error::Error;

/// Raw-sums accumulator for a single (X, Y) pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct PccAccumulator {
    n: u64,
    sum_x: f64,
    sum_x2: f64,
    sum_y: f64,
    sum_y2: f64,
    sum_xy: f64,
}

impl PccAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sum_x += x;
        self.sum_x2 += x * x;
        self.sum_y += y;
        self.sum_y2 += y * y;
        self.sum_xy += x * y;
    }

    /// Finalises the accumulated sums into a Pearson correlation coefficient.
    ///
    /// # Errors
    /// Returns [`Error::BadInput`] if fewer than 2 observations were
    /// accumulated, and [`Error::InvalidSample`] if either sample has zero
    /// variance.
    pub fn finalize(&self) -> Result<f64, Error> {
        if self.n < 2 {
            return Err(Error::BadInput(format!(
                "need at least 2 observations to correlate, got {}",
                self.n
            )));
        }
        let n = self.n as f64;
        let var_x = n.mul_add(self.sum_x2, -(self.sum_x * self.sum_x));
        let var_y = n.mul_add(self.sum_y2, -(self.sum_y * self.sum_y));
        if var_x <= 0.0 || var_y <= 0.0 {
            return Err(Error::InvalidSample(
                "zero variance in X or Y, correlation is undefined".into(),
            ));
        }
        let cov = n.mul_add(self.sum_xy, -(self.sum_x * self.sum_y));
        Ok(cov / (var_x.sqrt() * var_y.sqrt()))
    }
}

impl std::ops::Add for PccAccumulator {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            n: self.n + rhs.n,
            sum_x: self.sum_x + rhs.sum_x,
            sum_x2: self.sum_x2 + rhs.sum_x2,
            sum_y: self.sum_y + rhs.sum_y,
            sum_y2: self.sum_y2 + rhs.sum_y2,
            sum_xy: self.sum_xy + rhs.sum_xy,
        }
    }
}

fn accumulate(x: &[f64], y: &[f64]) -> PccAccumulator {
    let mut acc = PccAccumulator::new();
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        acc.observe(xi, yi);
    }
    acc
}

/// PCC(X, Y) for two equal-length scalar samples.
pub fn pcc_scalar_scalar(x: &[f64], y: &[f64]) -> Result<f64, Error> {
    if x.len() != y.len() {
        return Err(Error::ShapeMismatch(format!(
            "X has {} samples, Y has {}",
            x.len(),
            y.len()
        )));
    }
    accumulate(x, y).finalize()
}

/// PCC(X, Y\[k\]) for a fixed scalar sample X (length N) against K scalar
/// samples Y\[k\] (each length N).
pub fn pcc_scalar_batch(x: &[f64], ys: &[Vec<f64>]) -> Result<Vec<f64>, Error> {
    ys.par_iter()
        .map(|y| pcc_scalar_scalar(x, y))
        .collect()
}

/// PCC(X\[:,l\], Y) for an N×L observation matrix X against a fixed scalar
/// sample Y (length N). Returns one score per column `l`.
pub fn pcc_vector_scalar(xs: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>, Error> {
    let n = xs.len();
    if n != y.len() {
        return Err(Error::ShapeMismatch(format!(
            "X has {n} rows, Y has {} samples",
            y.len()
        )));
    }
    let l = xs.first().map_or(0, Vec::len);
    if xs.iter().any(|row| row.len() != l) {
        return Err(Error::ShapeMismatch(
            "rows of X do not share a common length".into(),
        ));
    }
    (0..l)
        .into_par_iter()
        .map(|col| {
            let mut acc = PccAccumulator::new();
            for (row, &yi) in xs.iter().zip(y.iter()) {
                acc.observe(row[col], yi);
            }
            acc.finalize()
        })
        .collect()
}

/// PCC(X\[:,l\], Y\[k\]) for an N×L observation matrix X against K scalar
/// samples Y\[k\] (each length N). Returns a K×L matrix of scores.
pub fn pcc_vector_batch(xs: &[Vec<f64>], ys: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, Error> {
    ys.par_iter().map(|y| pcc_vector_scalar(xs, y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_scalar_matches_known_case() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let pcc = pcc_scalar_scalar(&x, &y).unwrap();
        assert!((pcc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn symmetry_holds() {
        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let xy = pcc_scalar_scalar(&x, &y).unwrap();
        let yx = pcc_scalar_scalar(&y, &x).unwrap();
        assert!((xy - yx).abs() < 1e-12);
    }

    #[test]
    fn affine_invariance_holds_for_positive_scale() {
        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let base = pcc_scalar_scalar(&x, &y).unwrap();
        let scaled: Vec<f64> = x.iter().map(|v| 2.0 * v + 7.0).collect();
        let shifted: Vec<f64> = y.iter().map(|v| 3.0 * v - 1.0).collect();
        let transformed = pcc_scalar_scalar(&scaled, &shifted).unwrap();
        assert!((base - transformed).abs() < 1e-9);
    }

    #[test]
    fn affine_invariance_flips_sign_for_negative_scale() {
        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        let base = pcc_scalar_scalar(&x, &y).unwrap();
        let negated: Vec<f64> = x.iter().map(|v| -v).collect();
        let transformed = pcc_scalar_scalar(&negated, &y).unwrap();
        assert!((base + transformed).abs() < 1e-9);
    }

    #[test]
    fn zero_variance_is_invalid_sample() {
        let x = [1.0, 1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!(matches!(
            pcc_scalar_scalar(&x, &y),
            Err(Error::InvalidSample(_))
        ));
    }

    #[test]
    fn vector_reduction_matches_per_column_scalar() {
        let xs = vec![
            vec![1.0, 9.0],
            vec![2.0, 7.0],
            vec![3.0, 5.0],
            vec![4.0, 3.0],
            vec![5.0, 1.0],
        ];
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let cols = pcc_vector_scalar(&xs, &y).unwrap();
        let col0: Vec<f64> = xs.iter().map(|r| r[0]).collect();
        let col1: Vec<f64> = xs.iter().map(|r| r[1]).collect();
        assert!((cols[0] - pcc_scalar_scalar(&col0, &y).unwrap()).abs() < 1e-12);
        assert!((cols[1] - pcc_scalar_scalar(&col1, &y).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn batched_equivalence_matches_scalar_pcc() {
        let x: Vec<f64> = (0..1000).map(|i| f64::from(i % 17)).collect();
        let ys: Vec<Vec<f64>> = (0..32)
            .map(|k| (0..1000).map(|i| f64::from((i + k) % 13)).collect())
            .collect();
        let batch = pcc_scalar_batch(&x, &ys).unwrap();
        for (k, y) in ys.iter().enumerate() {
            let scalar = pcc_scalar_scalar(&x, y).unwrap();
            assert!((batch[k] - scalar).abs() < 1e-12);
        }
    }
}
