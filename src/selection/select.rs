//! Partition selection (median-of-three pivot, Hoare-style scan)

use crate::math;

/// Find the value of rank `k` (0-indexed) in `values`
///
/// Equivalent to `sorted(values)[k]`, in expected O(n) time. The slice is
/// partially reordered: on return, `values[k]` holds the answer.
///
/// The partition scans use strict comparisons, so runs of values equal to
/// the pivot stop both scans and get split evenly between the two halves.
///
/// # Panics
///
/// Panics if `k >= values.len()`.
///
/// # Example
///
/// ```
/// use descstats::selection::select;
///
/// let mut values = [5.0, 1.0, 4.0, 2.0, 3.0];
/// assert_eq!(select(&mut values, 1), 2.0);
/// assert_eq!(values[1], 2.0);
/// ```
pub fn select(values: &mut [f64], k: usize) -> f64 {
    assert!(
        k < values.len(),
        "rank {} out of bounds for {} values",
        k,
        values.len()
    );

    let mut left = 0;
    let mut right = values.len() - 1;

    loop {
        if right <= left + 1 {
            if right == left + 1 && values[right] < values[left] {
                values.swap(left, right);
            }
            return values[k];
        }

        // Median of three: order values[left], values[left + 1], values[right]
        // with the middle element moved to left + 1 as the pivot.
        let mid = left + (right - left) / 2;
        values.swap(mid, left + 1);
        if values[left] > values[right] {
            values.swap(left, right);
        }
        if values[left + 1] > values[right] {
            values.swap(left + 1, right);
        }
        if values[left] > values[left + 1] {
            values.swap(left, left + 1);
        }

        // values[left] <= pivot <= values[right] act as sentinels for the scans.
        let pivot = values[left + 1];
        let mut i = left + 1;
        let mut j = right;
        loop {
            i += 1;
            while values[i] < pivot {
                i += 1;
            }
            j -= 1;
            while values[j] > pivot {
                j -= 1;
            }
            if j < i {
                break;
            }
            values.swap(i, j);
        }
        values[left + 1] = values[j];
        values[j] = pivot;

        // The pivot sits at its final rank j.
        if j >= k {
            right = j - 1;
        }
        if j <= k {
            left = i;
        }
    }
}

/// Linearly interpolated percentile, `q` in `[0, 100]`
///
/// The fractional index `q * (n - 1) / 100` is split into the two
/// surrounding ranks and their values are blended. `q = 0` gives the
/// minimum and `q = 100` the maximum.
///
/// Returns NaN for an empty slice or a `q` outside `[0, 100]`.
pub fn percentile(values: &mut [f64], q: f64) -> f64 {
    let n = values.len();
    if n == 0 || !(0.0..=100.0).contains(&q) {
        return f64::NAN;
    }

    let index = q * (n - 1) as f64 / 100.0;
    let below = math::floor(index) as usize;
    let above = (below + 1).min(n - 1);
    let weight_above = index - below as f64;

    let low = select(values, below);
    if weight_above == 0.0 || above == below {
        return low;
    }
    let high = select(values, above);
    low * (1.0 - weight_above) + high * weight_above
}

/// Median by selection
///
/// Odd lengths need a single selection. Even lengths average the two middle
/// values as `low + (high - low) / 2`, which cannot overflow to infinity
/// for large finite inputs.
///
/// Returns NaN for an empty slice.
pub fn median(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }

    let high = select(values, n / 2);
    if n % 2 == 1 {
        return high;
    }
    let low = select(values, n / 2 - 1);
    low + 0.5 * (high - low)
}
