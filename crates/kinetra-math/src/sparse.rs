//! Sparse matrix representation and solver interface.
//!
//! Provides a CSR (Compressed Sparse Row) matrix and a trait for sparse
//! symmetric positive-definite solvers. The direct constraint solver
//! assembles the Schur complement of the assembled system in this format.

use serde::{Deserialize, Serialize};

use kinetra_types::Real;

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores a sparse matrix in row-major order. This is the standard
/// format for sparse linear algebra libraries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row pointer array (length = rows + 1).
    /// `row_ptr[i]..row_ptr[i+1]` are the indices into `col_idx` and `values`
    /// for non-zeros in row `i`.
    pub row_ptr: Vec<usize>,
    /// Column indices of non-zero entries.
    pub col_idx: Vec<usize>,
    /// Non-zero values.
    pub values: Vec<Real>,
}

impl CsrMatrix {
    /// Creates an empty CSR matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns the number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Creates a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries are summed.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, Real)]) -> Self {
        // Count entries per row
        let mut row_counts = vec![0usize; rows];
        for &(r, _, _) in triplets {
            row_counts[r] += 1;
        }

        // Build row_ptr
        let mut row_ptr = vec![0usize; rows + 1];
        for i in 0..rows {
            row_ptr[i + 1] = row_ptr[i] + row_counts[i];
        }

        let nnz = row_ptr[rows];
        let mut col_idx = vec![0usize; nnz];
        let mut values = vec![0.0; nnz];

        // Fill in — use row_counts as write cursor
        let mut cursor = row_ptr[..rows].to_vec();
        for &(r, c, v) in triplets {
            let pos = cursor[r];
            col_idx[pos] = c;
            values[pos] = v;
            cursor[r] += 1;
        }

        // Sort each row by column index and merge duplicates
        let mut merged_row_ptr = vec![0usize; rows + 1];
        let mut merged_cols = Vec::with_capacity(nnz);
        let mut merged_vals = Vec::with_capacity(nnz);

        for i in 0..rows {
            let start = row_ptr[i];
            let end = row_ptr[i + 1];
            let slice = &mut col_idx[start..end];
            let val_slice = &mut values[start..end];

            // Simple insertion sort (rows are typically small)
            for j in 1..slice.len() {
                let mut k = j;
                while k > 0 && slice[k - 1] > slice[k] {
                    slice.swap(k - 1, k);
                    val_slice.swap(k - 1, k);
                    k -= 1;
                }
            }

            for j in 0..slice.len() {
                if j > 0 && slice[j] == slice[j - 1] {
                    let last = merged_vals.len() - 1;
                    merged_vals[last] += val_slice[j];
                } else {
                    merged_cols.push(slice[j]);
                    merged_vals.push(val_slice[j]);
                }
            }
            merged_row_ptr[i + 1] = merged_cols.len();
        }

        Self {
            rows,
            cols,
            row_ptr: merged_row_ptr,
            col_idx: merged_cols,
            values: merged_vals,
        }
    }

    /// Dense matrix-vector product `y = A x`.
    pub fn mul_vec(&self, x: &[Real], y: &mut [Real]) {
        debug_assert_eq!(x.len(), self.cols);
        debug_assert_eq!(y.len(), self.rows);
        for (row, y_i) in y.iter_mut().enumerate() {
            let mut acc = 0.0;
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                acc += self.values[idx] * x[self.col_idx[idx]];
            }
            *y_i = acc;
        }
    }
}

/// Trait for sparse symmetric positive-definite solvers.
pub trait SparseSolver {
    /// Factorize the matrix. Call once per sparsity pattern/value set.
    fn factorize(&mut self, matrix: &CsrMatrix) -> Result<(), String>;

    /// Solve Ax = b using the pre-computed factorization.
    /// Returns x in the provided output buffer.
    fn solve(&self, rhs: &[Real], solution: &mut [Real]) -> Result<(), String>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;
}
