/// Check whether two floats have a relative difference of at most `$tolerance` times the smaller magnitude.
#[macro_export]
macro_rules! assert_floats_near_equal {
    ($val1:expr, $val2:expr, $tolerance:expr, $msg:expr) => {{
        let a: f64 = $val1;
        let b: f64 = $val2;
        let diff = (a - b).abs();
        let relative_diff = if a.abs() < b.abs() { diff / a.abs() } else { diff / b.abs() };
        assert!(
            relative_diff <= $tolerance,
            "{}: {} and {} differ by more than {}",
            $msg,
            a,
            b,
            $tolerance
        );
    }};
}
