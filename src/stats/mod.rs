//! Median calculation and per-trigger sample collection

pub mod collector;


pub use collector::SampleCollector;

/// Median of `values` without modifying the input.
///
/// Returns 0.0 for an empty slice. For an even count the two middle values
/// are averaged.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    median_in_place(&mut sorted)
}

/// Median of `values`, sorting the slice in place.
///
/// NaN values sort after every number, so they only affect the result when
/// they reach the middle of the slice.
pub fn median_in_place(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
