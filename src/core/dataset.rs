//! Observation table and design-matrix construction.

use crate::core::FactorError;
use faer::{Col, Mat};

/// Column name used for the constant-1 intercept column.
pub(crate) const INTERCEPT_NAME: &str = "const";

/// An ordered table of observations: one timestamp, one response value, and
/// one value per candidate factor per row.
///
/// The ingestion collaborator is responsible for ordering, period filtering,
/// and dropping rows with missing values; construction re-validates that every
/// value in use is finite and rejects the table otherwise.
#[derive(Debug, Clone)]
pub struct Dataset {
    timestamps: Vec<i64>,
    response: Col<f64>,
    factor_names: Vec<String>,
    factors: Mat<f64>,
}

impl Dataset {
    /// Build a dataset from row-major factor values.
    ///
    /// `factor_rows[i]` holds the values for observation `i`, aligned with
    /// `factor_names`. All series must have equal length and every value must
    /// be finite.
    pub fn new(
        timestamps: Vec<i64>,
        response: Vec<f64>,
        factor_names: Vec<String>,
        factor_rows: Vec<Vec<f64>>,
    ) -> Result<Self, FactorError> {
        let n = timestamps.len();
        if response.len() != n {
            return Err(FactorError::DimensionMismatch {
                x_rows: n,
                y_len: response.len(),
            });
        }
        if factor_rows.len() != n {
            return Err(FactorError::DimensionMismatch {
                x_rows: factor_rows.len(),
                y_len: n,
            });
        }

        let k = factor_names.len();
        for row in &factor_rows {
            if row.len() != k {
                return Err(FactorError::DimensionMismatch {
                    x_rows: row.len(),
                    y_len: k,
                });
            }
        }

        for (i, &y) in response.iter().enumerate() {
            if !y.is_finite() {
                return Err(FactorError::MissingValue {
                    column: "response".to_string(),
                    row: i,
                });
            }
        }
        for (i, row) in factor_rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(FactorError::MissingValue {
                        column: factor_names[j].clone(),
                        row: i,
                    });
                }
            }
        }

        let factors = Mat::from_fn(n, k, |i, j| factor_rows[i][j]);
        let response = Col::from_fn(n, |i| response[i]);

        Ok(Self {
            timestamps,
            response,
            factor_names,
            factors,
        })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// True when the dataset holds no observations.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Observation timestamps, in table order.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// The response series.
    pub fn response(&self) -> &Col<f64> {
        &self.response
    }

    /// Candidate factor names, in canonical column order.
    pub fn factor_names(&self) -> &[String] {
        &self.factor_names
    }

    /// Index of a factor in the canonical column order.
    fn factor_index(&self, name: &str) -> Result<usize, FactorError> {
        self.factor_names
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| FactorError::UnknownFactor(name.to_string()))
    }

    /// One factor column by name.
    pub fn factor_column(&self, name: &str) -> Result<Col<f64>, FactorError> {
        let j = self.factor_index(name)?;
        Ok(Col::from_fn(self.len(), |i| self.factors[(i, j)]))
    }

    /// The n×m matrix of the given factor subset, in subset order.
    pub fn factor_matrix<S: AsRef<str>>(&self, subset: &[S]) -> Result<Mat<f64>, FactorError> {
        let mut indices = Vec::with_capacity(subset.len());
        for name in subset {
            indices.push(self.factor_index(name.as_ref())?);
        }
        Ok(Mat::from_fn(self.len(), indices.len(), |i, j| {
            self.factors[(i, indices[j])]
        }))
    }

    /// Build a design matrix for a factor subset, optionally with a leading
    /// constant-1 intercept column.
    pub fn design_matrix<S: AsRef<str>>(
        &self,
        subset: &[S],
        with_intercept: bool,
    ) -> Result<DesignMatrix, FactorError> {
        let x = self.factor_matrix(subset)?;
        let names: Vec<String> = subset.iter().map(|s| s.as_ref().to_string()).collect();
        Ok(DesignMatrix::from_factors(names, x, with_intercept))
    }
}

/// A named design matrix: ordered column names and the numeric matrix, rows
/// aligned with the originating [`Dataset`].
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    /// Column names; `"const"` first when the intercept is present.
    pub column_names: Vec<String>,
    /// The n×p numeric matrix.
    pub matrix: Mat<f64>,
    /// Whether column 0 is the constant-1 intercept.
    pub has_intercept: bool,
}

impl DesignMatrix {
    /// Assemble a design matrix from raw factor columns, prepending the
    /// intercept column when requested.
    pub fn from_factors(factor_names: Vec<String>, x: Mat<f64>, with_intercept: bool) -> Self {
        let n = x.nrows();
        let m = x.ncols();

        if with_intercept {
            let matrix = Mat::from_fn(n, m + 1, |i, j| if j == 0 { 1.0 } else { x[(i, j - 1)] });
            let mut column_names = Vec::with_capacity(m + 1);
            column_names.push(INTERCEPT_NAME.to_string());
            column_names.extend(factor_names);
            Self {
                column_names,
                matrix,
                has_intercept: true,
            }
        } else {
            Self {
                column_names: factor_names,
                matrix: x,
                has_intercept: false,
            }
        }
    }

    /// Number of rows (observations).
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of columns (parameters).
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Names of the non-intercept columns.
    pub fn factor_names(&self) -> &[String] {
        if self.has_intercept {
            &self.column_names[1..]
        } else {
            &self.column_names
        }
    }
}
