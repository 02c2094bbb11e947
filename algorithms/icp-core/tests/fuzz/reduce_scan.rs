use bolero::check;
use icp_core::kernels::{reduce, scan};

const MAX_LEN: usize = 256;

fn normalize_i32(raw: &[i8]) -> Vec<i32> {
    let mut v: Vec<i32> = raw.iter().map(|&x| i32::from(x)).collect();
    v.truncate(MAX_LEN);
    if v.len() < 4 {
        v.resize(4, 0);
    }
    let rem = v.len() % 4;
    if rem != 0 {
        v.truncate(v.len() - rem);
    }
    v
}

/// Law 6: `inclusive_scan(x)[n-1] == reduce_sum(x)` for the same input.
#[test]
fn inclusive_scan_last_matches_reduce_sum() {
    check!().with_type::<Vec<i8>>().for_each(|raw| {
        let data = normalize_i32(raw);
        let cols = data.len();

        let inclusive = scan::inclusive_scan_i32(&data, 1, cols).unwrap();
        let reduced: i32 = data.iter().sum();

        assert_eq!(*inclusive.last().unwrap(), reduced);
    });
}

/// Law 5 (integer half): exclusive scan's final element plus the last input
/// equals the reduce-sum, and the reduction itself is bit-exact for integer
/// inputs (no rounding in `i32` addition).
#[test]
fn exclusive_scan_plus_last_equals_reduce_sum() {
    check!().with_type::<Vec<i8>>().for_each(|raw| {
        let data = normalize_i32(raw);
        let cols = data.len();

        let exclusive = scan::exclusive_scan_i32(&data, 1, cols).unwrap();
        let reduced: i32 = data.iter().sum();

        assert_eq!(*exclusive.last().unwrap() + *data.last().unwrap(), reduced);
    });
}

/// Law 5 (float half): `reduce_sum_f32_widening` (f64 accumulation) agrees
/// with a reference `f64` sum to within floating-point tolerance, for every
/// length the two-level tree supports.
#[test]
fn widening_reduce_matches_reference_sum() {
    check!().with_type::<Vec<i8>>().for_each(|raw| {
        let data = normalize_i32(raw);
        let cols = data.len();
        let as_f32: Vec<f32> = data.iter().map(|&x| x as f32).collect();

        let widened = reduce::reduce_sum_f32_widening(&as_f32, 1, cols).unwrap();
        let reference: f64 = as_f32.iter().map(|&x| f64::from(x)).sum();

        assert!((widened[0] - reference).abs() < 1e-6, "{} vs {}", widened[0], reference);
    });
}

/// `reduce_max_u32` is exact: it always returns the true maximum.
#[test]
fn reduce_max_is_exact() {
    check!().with_type::<Vec<u8>>().for_each(|raw| {
        let mut data: Vec<u32> = raw.iter().map(|&x| u32::from(x)).collect();
        data.truncate(MAX_LEN);
        if data.len() < 4 {
            data.resize(4, 0);
        }
        let rem = data.len() % 4;
        if rem != 0 {
            data.truncate(data.len() - rem);
        }

        let expected = *data.iter().max().unwrap();
        let out = reduce::reduce_max_u32(&data, 1, data.len()).unwrap();
        assert_eq!(out[0], expected);
    });
}
