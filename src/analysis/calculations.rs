//! Pure numeric helpers shared by the analyzers.
//!
//! All functions here are pure and testable without any I/O or images. Planes
//! are row-major `f64` slices with an explicit `width`/`height`; borders are
//! handled with reflect-101 (`2 1 | 0 1 2 ... n-1 | n-2 n-3`), which keeps the
//! edge pixel from being counted twice.

/// Map a possibly out-of-range index back into `0..n` by reflect-101.
pub fn reflect_101(i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let i = i.rem_euclid(period);
    if i >= n as isize {
        (period - i) as usize
    } else {
        i as usize
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by N). Empty input yields 0.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Percentile with linear interpolation between closest ranks.
///
/// `p` is in percent (0–100). Empty input yields 0. NaNs sort last.
///
/// # Examples
/// ```
/// # use print_grade::analysis::calculations::percentile;
/// assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0), 3.0);
/// assert_eq!(percentile(&[0.0, 10.0], 20.0), 2.0);
/// ```
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Normalized box filter with a `size`×`size` window (odd sizes center
/// exactly; even sizes lean toward the top-left like most imaging libraries).
///
/// Separable: one horizontal and one vertical pass over prefix sums, so the
/// cost does not depend on the window size.
pub fn box_blur(plane: &[f64], width: usize, height: usize, size: usize) -> Vec<f64> {
    debug_assert_eq!(plane.len(), width * height);
    if plane.is_empty() || size <= 1 {
        return plane.to_vec();
    }
    let before = (size / 2) as isize;
    let norm = size as f64;

    let mut horizontal = vec![0.0; plane.len()];
    let mut prefix = Vec::with_capacity(width + size + 1);
    for y in 0..height {
        let row = &plane[y * width..(y + 1) * width];
        window_sums(row, size, before, &mut prefix);
        for x in 0..width {
            horizontal[y * width + x] = (prefix[x + size] - prefix[x]) / norm;
        }
    }

    let mut out = vec![0.0; plane.len()];
    let mut column = vec![0.0; height];
    for x in 0..width {
        for (y, slot) in column.iter_mut().enumerate() {
            *slot = horizontal[y * width + x];
        }
        window_sums(&column, size, before, &mut prefix);
        for y in 0..height {
            out[y * width + x] = (prefix[y + size] - prefix[y]) / norm;
        }
    }
    out
}

/// Prefix sums over `line` padded by reflect-101 so that
/// `prefix[i + size] - prefix[i]` is the window sum centered on `i`.
fn window_sums(line: &[f64], size: usize, before: isize, prefix: &mut Vec<f64>) {
    let n = line.len();
    prefix.clear();
    prefix.push(0.0);
    let mut acc = 0.0;
    for i in 0..(n + size - 1) as isize {
        acc += line[reflect_101(i - before, n)];
        prefix.push(acc);
    }
}

/// 4-neighbour discrete Laplacian (`[0 1 0; 1 -4 1; 0 1 0]`) over a gray plane.
pub fn laplacian(plane: &[f64], width: usize, height: usize) -> Vec<f64> {
    debug_assert_eq!(plane.len(), width * height);
    let mut out = Vec::with_capacity(plane.len());
    for y in 0..height {
        let up = reflect_101(y as isize - 1, height);
        let down = reflect_101(y as isize + 1, height);
        for x in 0..width {
            let left = reflect_101(x as isize - 1, width);
            let right = reflect_101(x as isize + 1, width);
            let center = plane[y * width + x];
            out.push(
                plane[up * width + x]
                    + plane[down * width + x]
                    + plane[y * width + left]
                    + plane[y * width + right]
                    - 4.0 * center,
            );
        }
    }
    out
}

/// Variance of the Laplacian response: the focus measure used for both the
/// global score and every zone.
pub fn laplacian_variance(plane: &[f64], width: usize, height: usize) -> f64 {
    if width == 0 || height == 0 {
        return 0.0;
    }
    variance(&laplacian(plane, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // reflect_101
    // =========================================================================

    #[test]
    fn reflect_inside_is_identity() {
        assert_eq!(reflect_101(3, 5), 3);
    }

    #[test]
    fn reflect_negative_mirrors_without_edge() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
    }

    #[test]
    fn reflect_past_end_mirrors_without_edge() {
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
    }

    #[test]
    fn reflect_far_out_of_range_wraps() {
        // window wider than the line
        assert_eq!(reflect_101(-7, 3), 1);
        assert_eq!(reflect_101(9, 3), 1);
    }

    #[test]
    fn reflect_single_element() {
        assert_eq!(reflect_101(-4, 1), 0);
        assert_eq!(reflect_101(4, 1), 0);
    }

    // =========================================================================
    // statistics
    // =========================================================================

    #[test]
    fn variance_is_population_variance() {
        assert_eq!(variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 4.0);
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
    }

    #[test]
    fn empty_statistics_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(percentile(&[], 20.0), 0.0);
    }

    #[test]
    fn percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 100.0), 50.0);
        assert!((percentile(&values, 20.0) - 18.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_ignores_input_order() {
        assert_eq!(percentile(&[5.0, 1.0, 3.0], 50.0), 3.0);
    }

    #[test]
    fn median_of_even_count_averages_middle() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    // =========================================================================
    // box_blur
    // =========================================================================

    #[test]
    fn box_blur_of_constant_is_constant() {
        let plane = vec![7.0; 12 * 9];
        let out = box_blur(&plane, 12, 9, 7);
        assert!(out.iter().all(|&v| (v - 7.0).abs() < 1e-9));
    }

    #[test]
    fn box_blur_three_wide_matches_manual_average() {
        // single row: [0, 3, 6]; reflect-101 pads as 3 | 0 3 6 | 3
        let out = box_blur(&[0.0, 3.0, 6.0], 3, 1, 3);
        assert!((out[0] - 2.0).abs() < 1e-9);
        assert!((out[1] - 3.0).abs() < 1e-9);
        assert!((out[2] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn box_blur_window_larger_than_image() {
        let plane: Vec<f64> = (0..4).map(f64::from).collect();
        let out = box_blur(&plane, 2, 2, 15);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn box_blur_size_one_is_identity() {
        let plane = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(box_blur(&plane, 2, 2, 1), plane);
    }

    // =========================================================================
    // laplacian
    // =========================================================================

    #[test]
    fn laplacian_of_constant_is_zero() {
        let plane = vec![42.0; 25];
        assert!(laplacian(&plane, 5, 5).iter().all(|&v| v == 0.0));
        assert_eq!(laplacian_variance(&plane, 5, 5), 0.0);
    }

    #[test]
    fn laplacian_of_single_spike() {
        let mut plane = vec![0.0; 9];
        plane[4] = 10.0;
        let lap = laplacian(&plane, 3, 3);
        assert_eq!(lap[4], -40.0);
        // top edge reflects the spike row onto both vertical neighbours
        assert_eq!(lap[1], 20.0);
        assert_eq!(lap[0], 0.0);
    }

    #[test]
    fn laplacian_of_linear_ramp_is_zero_inside() {
        let plane: Vec<f64> = (0..5).flat_map(|_| (0..5).map(f64::from)).collect();
        let lap = laplacian(&plane, 5, 5);
        assert_eq!(lap[2 * 5 + 2], 0.0);
    }

    #[test]
    fn laplacian_variance_of_empty_plane() {
        assert_eq!(laplacian_variance(&[], 0, 0), 0.0);
    }
}
