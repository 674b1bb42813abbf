use crate::numerical::num_errors::{NumError, check_sample_set};
use crate::numerical::trace::{LogTrace, NoTrace, TraceSink};
use nalgebra::DVector;

/// i-th Lagrange basis polynomial of the nodes `x_data` at `x`
fn basis(x: f64, i: usize, x_data: &[f64], sink: &mut dyn TraceSink) -> f64 {
    let mut product = 1.0;
    for (j, xj) in x_data.iter().enumerate() {
        if j != i {
            product *= (x - xj) / (x_data[i] - xj);
            if sink.enabled() {
                sink.note(&format!("  · ({} - {}) / ({} - {})", x, xj, x_data[i], xj));
            }
        }
    }
    sink.scalar(&format!("l{}(x)", i), product);
    product
}

/// value of the interpolating polynomial through `(x_data, y_data)` at `x_point`
pub fn lagrange_point(x_point: f64, x_data: &[f64], y_data: &[f64]) -> Result<f64, NumError> {
    lagrange_point_traced(x_point, x_data, y_data, &mut NoTrace)
}

pub fn lagrange_point_print(
    x_point: f64,
    x_data: &[f64],
    y_data: &[f64],
    digits: usize,
) -> Result<f64, NumError> {
    lagrange_point_traced(x_point, x_data, y_data, &mut LogTrace::new(digits))
}

pub fn lagrange_point_traced(
    x_point: f64,
    x_data: &[f64],
    y_data: &[f64],
    sink: &mut dyn TraceSink,
) -> Result<f64, NumError> {
    check_sample_set(x_data, y_data, 1)?;
    let n = x_data.len();
    let mut sum = 0.0;
    for i in 0..n {
        sum += basis(x_point, i, x_data, sink) * y_data[i];
    }
    if sink.enabled() {
        let terms: Vec<String> = (0..n).map(|i| format!("l{}(x)·y{}", i, i)).collect();
        sink.note(&format!("P{}(x) = {}", n, terms.join(" + ")));
    }
    sink.scalar(&format!("P{}({})", n, x_point), sum);
    Ok(sum)
}

/// interpolating polynomial evaluated at every point of `x`
pub fn lagrange_vec(x: &[f64], x_data: &[f64], y_data: &[f64]) -> Result<DVector<f64>, NumError> {
    check_sample_set(x_data, y_data, 1)?;
    let values = x
        .iter()
        .map(|&xi| lagrange_point(xi, x_data, y_data))
        .collect::<Result<Vec<f64>, NumError>>()?;
    Ok(DVector::from_vec(values))
}
