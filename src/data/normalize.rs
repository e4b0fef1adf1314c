use crate::{matrix::Matrix2, prelude::*};

/// Column-wise minimum and maximum of a reference dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMax {
    ranges: Vec<(f64, f64)>,
}

impl MinMax {
    pub fn fit(reference: &Matrix2<f64>) -> Result<Self> {
        let ranges = (0..reference.cols())
            .map(|col| reference.column_range(col))
            .collect::<Option<Vec<_>>>();

        match ranges {
            Some(ranges) if reference.rows() > 0 => Ok(Self { ranges }),
            _ => Err(Error::EmptyDataset("normalization reference".to_string())),
        }
    }

    pub fn ranges(&self) -> &[(f64, f64)] {
        &self.ranges
    }

    /// Maps each value into [0, 1] for values inside the reference range.
    /// A column whose min equals its max maps to 0.
    pub fn transform_row(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.ranges.len() {
            return Err(Error::DimensionErr {
                context: "normalized input",
                expected: self.ranges.len(),
                actual: input.len(),
            });
        }

        Ok(input
            .iter()
            .zip(&self.ranges)
            .map(|(&x, &(min, max))| scale(x, min, max))
            .collect())
    }

    pub fn transform(&self, matrix: &Matrix2<f64>) -> Result<Matrix2<f64>> {
        let mut out = Matrix2::new(matrix.rows(), matrix.cols());
        for (r, row) in matrix.iter_rows().enumerate() {
            for (c, x) in self.transform_row(row)?.into_iter().enumerate() {
                out[(r, c)] = x;
            }
        }
        Ok(out)
    }
}

fn scale(x: f64, min: f64, max: f64) -> f64 {
    if max == min {
        0.0
    } else {
        (x - min) / (max - min)
    }
}

/// Rescales every column of `matrix` into [0, 1] using that column's own min and max.
pub fn normalize_matrix(matrix: &Matrix2<f64>) -> Matrix2<f64> {
    let mut out = matrix.clone();
    for col in 0..matrix.cols() {
        if let Some((min, max)) = matrix.column_range(col) {
            for row in 0..matrix.rows() {
                out[(row, col)] = scale(matrix[(row, col)], min, max);
            }
        }
    }
    out
}

/// Rescales one vector with the column ranges of `reference`.
pub fn normalize_input(input: &[f64], reference: &Matrix2<f64>) -> Result<Vec<f64>> {
    MinMax::fit(reference)?.transform_row(input)
}
