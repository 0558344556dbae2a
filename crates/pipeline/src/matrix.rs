//! Dense row-major feature matrix.

/// One row per record, one column per feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// An all-zero matrix
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![0.0; n_rows * n_cols],
        }
    }

    /// Build from equally sized rows.
    ///
    /// Returns `None` if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<f64>>, n_cols: usize) -> Option<Self> {
        if rows.iter().any(|row| row.len() != n_cols) {
            return None;
        }
        let n_rows = rows.len();
        let data = rows.into_iter().flatten().collect();
        Some(Self { n_rows, n_cols, data })
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.n_cols;
        &mut self.data[start..start + self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_rows).map(move |r| self.row(r))
    }

    /// New matrix holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols);
        for &idx in indices {
            data.extend_from_slice(self.row(idx));
        }
        Self {
            n_rows: indices.len(),
            n_cols: self.n_cols,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_access() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.rows().count(), 2);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(FeatureMatrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]], 1).is_none());
    }

    #[test]
    fn test_select_rows() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]], 1).unwrap();
        let picked = m.select_rows(&[2, 0]);
        assert_eq!(picked.shape(), (2, 1));
        assert_eq!(picked.row(0), &[3.0]);
        assert_eq!(picked.row(1), &[1.0]);
    }

    #[test]
    fn test_row_mut() {
        let mut m = FeatureMatrix::zeros(2, 3);
        m.row_mut(1)[2] = 5.0;
        assert_eq!(m.get(1, 2), 5.0);
        assert_eq!(m.get(0, 2), 0.0);
    }
}
