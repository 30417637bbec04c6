use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Square matrix of precomputed pairwise similarity scores, indexed by catalog row
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> AppResult<Self> {
        let matrix = Self { rows };
        matrix.validate(matrix.rows.len())?;
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Checks the matrix is `expected` x `expected` with finite entries
    pub fn validate(&self, expected: usize) -> AppResult<()> {
        if self.rows.len() != expected {
            return Err(AppError::Artifact(format!(
                "similarity matrix has {} rows, expected {}",
                self.rows.len(),
                expected
            )));
        }

        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != expected {
                return Err(AppError::Artifact(format!(
                    "similarity row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    expected
                )));
            }
            if let Some(j) = row.iter().position(|score| !score.is_finite()) {
                return Err(AppError::Artifact(format!(
                    "similarity[{}][{}] is not a finite number",
                    i, j
                )));
            }
        }

        Ok(())
    }

    /// Every column of row `index` paired with its score, highest score first.
    /// Equal scores keep ascending column order.
    pub fn ranked(&self, index: usize) -> Option<Vec<(usize, f64)>> {
        let mut scored: Vec<(usize, f64)> = self.row(index)?.iter().copied().enumerate().collect();
        // sort_by is stable, so ties stay in column order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Some(scored)
    }
}
