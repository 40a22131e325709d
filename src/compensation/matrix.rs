//! Small dense square matrices for spillover unmixing.

/// Pivots smaller than this (relative to the largest entry) count as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Row-major dense square matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// Wrap `n * n` row-major values; `None` when the length is wrong
    pub fn from_row_major(n: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == n * n).then_some(Self { n, data })
    }

    /// Identity of size `n`
    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self { n, data }
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.n
    }

    /// Entry at row `i`, column `j`
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// One row as a slice
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Row-major values
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Gauss-Jordan inverse with partial pivoting; `None` when singular
    pub fn inverse(&self) -> Option<SquareMatrix> {
        let n = self.n;
        let scale = self
            .data
            .iter()
            .fold(0.0f64, |acc, v| acc.max(v.abs()))
            .max(1.0);
        if self.data.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let mut a = self.data.clone();
        let mut inv = SquareMatrix::identity(n).data;

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&r1, &r2| a[r1 * n + col].abs().total_cmp(&a[r2 * n + col].abs()))?;
            let pivot = a[pivot_row * n + col];
            if pivot.abs() < SINGULAR_TOLERANCE * scale {
                return None;
            }
            if pivot_row != col {
                for k in 0..n {
                    a.swap(pivot_row * n + k, col * n + k);
                    inv.swap(pivot_row * n + k, col * n + k);
                }
            }

            for k in 0..n {
                a[col * n + k] /= pivot;
                inv[col * n + k] /= pivot;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a[r * n + col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..n {
                    a[r * n + k] -= factor * a[col * n + k];
                    inv[r * n + k] -= factor * inv[col * n + k];
                }
            }
        }

        Some(SquareMatrix { n, data: inv })
    }

    /// `out = v * self` for a row vector `v`
    pub fn left_multiply(&self, v: &[f64], out: &mut [f64]) {
        for (j, o) in out.iter_mut().enumerate().take(self.n) {
            *o = (0..self.n).map(|i| v[i] * self.data[i * self.n + j]).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_of_known_matrix() {
        let m = SquareMatrix::from_row_major(2, vec![4.0, 7.0, 2.0, 6.0]).unwrap();
        let inv = m.inverse().unwrap();
        let expected = [0.6, -0.7, -0.2, 0.4];
        for (a, b) in inv.as_slice().iter().zip(expected) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inverse_needs_pivoting() {
        let m = SquareMatrix::from_row_major(2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(m.inverse().unwrap(), m);
    }

    #[test]
    fn test_singular_matrix() {
        let m = SquareMatrix::from_row_major(2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_left_multiply() {
        let m = SquareMatrix::from_row_major(2, vec![1.0, 0.5, 0.0, 1.0]).unwrap();
        let mut out = [0.0; 2];
        m.left_multiply(&[10.0, 2.0], &mut out);
        assert_eq!(out, [10.0, 7.0]);
    }
}
