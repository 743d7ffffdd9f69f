//! Numerical primitives: linear interpolation, least-squares polynomial fit,
//! forward difference and minimum reduction.
//!
//! All functions work on plain slices and never panic on user input; shape
//! problems are reported through [`NumError`].

use nalgebra::{DMatrix, DVector};

use crate::error::{NumError, NumResult};

/// `num` evenly spaced values over `[start, stop]`, both endpoints included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut out: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            // Pin the last point so rounding never drifts past `stop`.
            out[num - 1] = stop;
            out
        }
    }
}

fn validate_knots(xp: &[f64], fp: &[f64]) -> NumResult<()> {
    if xp.len() != fp.len() {
        return Err(NumError::LengthMismatch(xp.len(), fp.len()));
    }
    if xp.len() < 2 {
        return Err(NumError::TooFewSamples {
            op: "interpolation",
            required: 2,
            got: xp.len(),
        });
    }
    if xp.windows(2).any(|w| w[1] <= w[0]) {
        return Err(NumError::NotSorted);
    }
    Ok(())
}

/// Knots must already be validated.
fn interp_at(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }
    // First knot strictly greater than x; x lies in [xp[i-1], xp[i]).
    let i = xp.partition_point(|&k| k <= x);
    let (x0, x1) = (xp[i - 1], xp[i]);
    let t = (x - x0) / (x1 - x0);
    fp[i - 1] + t * (fp[i] - fp[i - 1])
}

/// Piecewise-linear interpolation of `x` over strictly increasing knots `xp`
/// with values `fp`. Queries outside the knots clamp to the boundary values.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> NumResult<f64> {
    validate_knots(xp, fp)?;
    Ok(interp_at(x, xp, fp))
}

/// Vectorised [`interp`]; the knots are validated once.
pub fn interp_many(xs: &[f64], xp: &[f64], fp: &[f64]) -> NumResult<Vec<f64>> {
    validate_knots(xp, fp)?;
    Ok(xs.iter().map(|&x| interp_at(x, xp, fp)).collect())
}

/// Least-squares polynomial fit of the given degree.
///
/// Coefficients are returned highest degree first, so `polyval(&c, x)`
/// evaluates the fitted polynomial. The Vandermonde system is solved through
/// SVD, so fewer samples than coefficients still yield the minimum-norm
/// solution. At least two distinct x values are required.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> NumResult<Vec<f64>> {
    if xs.len() != ys.len() {
        return Err(NumError::LengthMismatch(xs.len(), ys.len()));
    }
    if xs.len() < 2 {
        return Err(NumError::TooFewSamples {
            op: "polynomial fit",
            required: 2,
            got: xs.len(),
        });
    }
    if xs.iter().all(|&x| x == xs[0]) {
        return Err(NumError::Singular);
    }

    let cols = degree + 1;
    let a = DMatrix::from_fn(xs.len(), cols, |i, j| xs[i].powi((degree - j) as i32));
    let b = DVector::from_column_slice(ys);
    let coeffs = solve_least_squares(a, &b)?;
    Ok(coeffs.iter().copied().collect())
}

/// Solve `min |A c - b|` with the pseudo-inverse: singular values below the
/// numpy-style cutoff are treated as zero.
fn solve_least_squares(a: DMatrix<f64>, b: &DVector<f64>) -> NumResult<DVector<f64>> {
    let dim = a.nrows().max(a.ncols()) as f64;
    let svd = a.svd(true, true);
    let tol = svd.singular_values.max() * dim * f64::EPSILON;
    let coeffs = svd.solve(b, tol).map_err(|_| NumError::Singular)?;
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(NumError::Singular);
    }
    Ok(coeffs)
}

/// Evaluate a polynomial (highest degree first) at `x` with Horner's rule.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// First-order forward difference: `out[i] = ys[i + 1] - ys[i]`.
pub fn diff(ys: &[f64]) -> Vec<f64> {
    ys.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Minimum value and the index of its first occurrence.
pub fn min(ys: &[f64]) -> NumResult<(usize, f64)> {
    let mut iter = ys.iter().copied().enumerate();
    let first = iter.next().ok_or(NumError::TooFewSamples {
        op: "minimum",
        required: 1,
        got: 0,
    })?;
    Ok(iter.fold(first, |best, cur| if cur.1 < best.1 { cur } else { best }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(0.0, 4.0, 100);
        assert_eq!(v.len(), 100);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[99], 4.0);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_linspace_degenerate() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        assert_eq!(linspace(0.0, 2.0, 3), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_interp_reproduces_knots() {
        let xp = [0.0, 1.0, 2.0, 3.0, 4.0];
        let fp = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = interp_many(&xp, &xp, &fp).unwrap();
        assert_eq!(out, fp.to_vec());
    }

    #[test]
    fn test_interp_midpoints_and_clamping() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 2.0, 1.0];
        assert!(close(interp(0.5, &xp, &fp).unwrap(), 1.0));
        assert!(close(interp(1.5, &xp, &fp).unwrap(), 1.5));
        assert_eq!(interp(-3.0, &xp, &fp).unwrap(), 0.0);
        assert_eq!(interp(9.0, &xp, &fp).unwrap(), 1.0);
    }

    #[test]
    fn test_interp_errors() {
        assert!(matches!(
            interp(0.0, &[0.0], &[1.0]),
            Err(NumError::TooFewSamples { required: 2, got: 1, .. })
        ));
        assert!(matches!(
            interp(0.0, &[0.0, 1.0], &[1.0]),
            Err(NumError::LengthMismatch(2, 1))
        ));
        assert!(matches!(
            interp(0.0, &[1.0, 1.0], &[1.0, 2.0]),
            Err(NumError::NotSorted)
        ));
    }

    #[test]
    fn test_polyfit_exact_quadratic() {
        let xs: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x * x - 3.0 * x + 1.0).collect();
        let c = polyfit(&xs, &ys, 2).unwrap();
        assert!(close(c[0], 2.0), "{c:?}");
        assert!(close(c[1], -3.0), "{c:?}");
        assert!(close(c[2], 1.0), "{c:?}");
    }

    #[test]
    fn test_polyfit_linear_data_has_no_curvature() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 2.0, 3.0, 4.0, 5.0];
        let c = polyfit(&xs, &ys, 2).unwrap();
        assert!(c[0].abs() < 1e-9);
        assert!(close(c[1], 1.0));
        assert!(close(c[2], 1.0));
    }

    #[test]
    fn test_polyfit_least_squares_residual() {
        // Noisy line: the best linear fit of (0,0),(1,1),(2,0) is y = 1/3.
        let c = polyfit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], 1).unwrap();
        assert!(c[0].abs() < 1e-10);
        assert!(close(c[1], 1.0 / 3.0));
    }

    #[test]
    fn test_polyfit_too_few() {
        assert!(matches!(
            polyfit(&[0.0], &[1.0], 2),
            Err(NumError::TooFewSamples { required: 2, got: 1, .. })
        ));
    }

    #[test]
    fn test_polyfit_underdetermined_is_minimum_norm() {
        // Two points, three coefficients: every a*x^2 + b*x + c through
        // (0,1),(1,2) fits exactly; the smallest one is [0.5, 0.5, 1.0].
        let c = polyfit(&[0.0, 1.0], &[1.0, 2.0], 2).unwrap();
        assert_eq!(c.len(), 3);
        assert!(close(c[0], 0.5), "{c:?}");
        assert!(close(c[1], 0.5), "{c:?}");
        assert!(close(c[2], 1.0), "{c:?}");
        assert!(close(polyval(&c, 0.0), 1.0));
        assert!(close(polyval(&c, 1.0), 2.0));
    }

    #[test]
    fn test_polyfit_singular() {
        // Repeated x makes the Vandermonde matrix rank-deficient.
        assert!(matches!(
            polyfit(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 2),
            Err(NumError::Singular)
        ));
    }

    #[test]
    fn test_polyval_horner() {
        assert_eq!(polyval(&[2.0, -3.0, 1.0], 2.0), 3.0);
        assert_eq!(polyval(&[], 5.0), 0.0);
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 2.0, 3.0, 4.0, 5.0]), vec![1.0; 4]);
        assert_eq!(diff(&[1.0, 4.0, 2.0]), vec![3.0, -2.0]);
        assert!(diff(&[3.0]).is_empty());
    }

    #[test]
    fn test_min_first_occurrence() {
        assert_eq!(min(&[3.0, 1.0, 2.0]).unwrap(), (1, 1.0));
        assert_eq!(min(&[2.0, -1.0, -1.0]).unwrap(), (1, -1.0));
        assert!(min(&[]).is_err());
    }
}
