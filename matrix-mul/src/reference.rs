//! Single-threaded reference multiplication.
//!
//! [`multiply_row`] is the only place a product element is accumulated.
//! Workers call it too, so both paths produce bit-identical results.

use shm_matmul_types::{Dimensions, Matrix};

use crate::Error;

/// Checks that `a` and `b` can be multiplied.
pub fn dimensions(a: &Matrix, b: &Matrix) -> Result<Dimensions, Error> {
    if a.cols() != b.rows() {
        return Err(Error::DimensionMismatch(
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols(),
        ));
    }
    Ok(Dimensions {
        n: a.rows(),
        m: a.cols(),
        p: b.cols(),
    })
}

/// Computes row `row` of `a * b` into `out`, which must be `b.cols()` wide.
pub fn multiply_row(a: &Matrix, b: &Matrix, row: usize, out: &mut [f64]) {
    let a_row = a.row(row);
    let b_data = b.as_slice();
    let p = b.cols();

    for (j, slot) in out.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (k, &a_val) in a_row.iter().enumerate() {
            sum += a_val * b_data[k * p + j];
        }
        *slot = sum;
    }
}

/// Computes the full product `a * b`.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, Error> {
    let dims = dimensions(a, b)?;
    let mut data = vec![0.0; dims.n * dims.p];
    for (i, out) in data.chunks_exact_mut(dims.p).enumerate() {
        multiply_row(a, b, i, out);
    }
    Ok(Matrix::from_vec(dims.n, dims.p, data)?)
}
