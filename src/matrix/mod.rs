use crate::prelude::*;
use std::ops::{Index, IndexMut};

/// Row-major dense matrix. Datasets store one example per row.
#[derive(Debug, PartialEq, Clone)]
pub struct Matrix2<T> {
    data: Vec<T>,
    dim: (usize, usize),
}

impl<T: Default + Clone> Matrix2<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            dim: (rows, cols),
        }
    }
}

impl<T> Matrix2<T> {
    pub fn from_array<const R: usize, const C: usize>(arr: [[T; C]; R]) -> Self {
        let mut data = Vec::with_capacity(R * C);

        for row in arr {
            for x in row {
                data.push(x);
            }
        }

        Self { data, dim: (R, C) }
    }

    /// Builds a matrix from rows, failing on the first row whose width differs from the first.
    pub fn from_vec(vec: Vec<Vec<T>>) -> Result<Self> {
        let rows = vec.len();
        let cols = vec.first().map(|row| row.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(rows * cols);
        for (i, row) in vec.into_iter().enumerate() {
            if cols != row.len() {
                return Err(Error::RaggedRow {
                    row: i,
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self {
            data,
            dim: (rows, cols),
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.dim.0
    }

    pub fn cols(&self) -> usize {
        self.dim.1
    }

    pub fn row(&self, row: usize) -> &[T] {
        let cols = self.cols();
        &self.data[row * cols..(row + 1) * cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows()).map(move |r| self.row(r))
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = &T> + '_ {
        (0..self.rows()).map(move |r| &self[(r, col)])
    }

    pub fn to_vec(self) -> Vec<Vec<T>> {
        let cols = self.cols().max(1);
        let mut res = Vec::with_capacity(self.rows());
        let mut data = self.data.into_iter();
        for _ in 0..self.dim.0 {
            res.push(data.by_ref().take(cols).collect());
        }
        res
    }
}

impl Matrix2<f64> {
    /// Smallest and largest value of a column, or `None` for a matrix without rows.
    pub fn column_range(&self, col: usize) -> Option<(f64, f64)> {
        self.column(col).fold(None, |acc, &x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
    }
}

impl<T> Index<(usize, usize)> for Matrix2<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i * self.cols() + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix2<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        let idx = i * self.cols() + j;
        &mut self.data[idx]
    }
}

impl From<Matrix2<i32>> for Matrix2<f64> {
    fn from(value: Matrix2<i32>) -> Self {
        Self {
            dim: value.dim(),
            data: value.data.into_iter().map(|x| x as f64).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn access_matrix2_from_array() {
        let matrix = Matrix2::from_array([[1, 2, 3], [4, 5, 6]]);
        assert_eq!(matrix[(0, 1)], 2);
        assert_eq!(matrix[(1, 2)], 6);
        assert_eq!(matrix.row(1), &[4, 5, 6]);
        assert_eq!(matrix.column(2).copied().collect::<Vec<_>>(), vec![3, 6]);
    }

    #[test]
    fn matrix2_from_vec_err() {
        let vec = vec![vec![1, 2, 3], vec![4, 5, 9], vec![1, 2]];
        let matrix = Matrix2::from_vec(vec);

        assert_eq!(
            matrix,
            Err(Error::RaggedRow {
                row: 2,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn column_ranges() {
        let matrix: Matrix2<f64> = Matrix2::from_array([[1, 9, 0], [3, -2, 0], [2, 4, 1]]).into();

        assert_eq!(matrix.column_range(0), Some((1.0, 3.0)));
        assert_eq!(matrix.column_range(1), Some((-2.0, 9.0)));
        assert_eq!(Matrix2::<f64>::new(0, 2).column_range(0), None);
    }
}
