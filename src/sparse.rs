use serde::{Deserialize, Serialize};

/// Compressed sparse row matrix of signed indicators (+1 / -1).
///
/// Zeros are never stored and column indices are strictly ascending within each
/// row, so two matrices holding the same entries compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCsrMatrix {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<i8>,
}

impl SignedCsrMatrix {
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[i8] {
        &self.values
    }

    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, i8)> + '_ {
        let (start, end) = self.row_bounds(row);
        self.col_idx[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    pub fn row_nnz(&self, row: usize) -> usize {
        let (start, end) = self.row_bounds(row);
        end - start
    }

    pub fn row_sum(&self, row: usize) -> i32 {
        self.row(row).map(|(_, v)| i32::from(v)).sum()
    }

    pub fn get(&self, row: usize, col: usize) -> i8 {
        let (start, end) = self.row_bounds(row);
        match self.col_idx[start..end].binary_search(&col) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0,
        }
    }

    pub fn column_sums(&self) -> Vec<i64> {
        let mut sums = vec![0i64; self.ncols];
        for (col, v) in self.col_idx.iter().zip(&self.values) {
            sums[*col] += i64::from(*v);
        }
        sums
    }

    /// `(row, col, value)` for every stored entry, row-major.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, i8)> + '_ {
        (0..self.nrows).flat_map(move |row| self.row(row).map(move |(col, v)| (row, col, v)))
    }

    pub fn to_dense(&self) -> Vec<Vec<i8>> {
        let mut dense = vec![vec![0i8; self.ncols]; self.nrows];
        for (row, col, v) in self.triplets() {
            dense[row][col] = v;
        }
        dense
    }

    fn row_bounds(&self, row: usize) -> (usize, usize) {
        // Out-of-range rows read as empty.
        if row >= self.nrows {
            return (0, 0);
        }
        (self.row_ptr[row], self.row_ptr[row + 1])
    }
}

/// Append-only row builder for [`SignedCsrMatrix`].
#[derive(Debug, Clone)]
pub struct CsrBuilder {
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<i8>,
}

impl CsrBuilder {
    pub fn new(ncols: usize) -> Self {
        Self::with_capacity(ncols, 0, 0)
    }

    pub fn with_capacity(ncols: usize, rows: usize, nnz: usize) -> Self {
        let mut row_ptr = Vec::with_capacity(rows + 1);
        row_ptr.push(0);
        Self {
            ncols,
            row_ptr,
            col_idx: Vec::with_capacity(nnz),
            values: Vec::with_capacity(nnz),
        }
    }

    /// Appends one row. `entries` must be sorted by strictly ascending column,
    /// hold only in-range columns and carry no zero values.
    pub fn push_row(&mut self, entries: &[(usize, i8)]) {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(entries.iter().all(|(c, v)| *c < self.ncols && *v != 0));
        for (col, v) in entries {
            self.col_idx.push(*col);
            self.values.push(*v);
        }
        self.row_ptr.push(self.col_idx.len());
    }

    pub fn rows(&self) -> usize {
        self.row_ptr.len() - 1
    }

    pub fn finish(self) -> SignedCsrMatrix {
        SignedCsrMatrix {
            nrows: self.row_ptr.len() - 1,
            ncols: self.ncols,
            row_ptr: self.row_ptr,
            col_idx: self.col_idx,
            values: self.values,
        }
    }
}
