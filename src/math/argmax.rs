//! Argmax with lexicographic (first occurrence) tie-breaking.
//!
//! Later entries replace the running best only when strictly greater, so
//! ties resolve to the lowest index. NaN never wins a comparison.

/// Index and value of the maximum of `values`, or `None` if empty or all NaN.
pub fn argmax_first(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_pick_first_index() {
        assert_eq!(argmax_first(&[1.0, 3.0, 3.0, 2.0]), Some((1, 3.0)));
    }

    #[test]
    fn empty_and_nan_inputs() {
        assert_eq!(argmax_first(&[]), None);
        assert_eq!(argmax_first(&[f64::NAN]), None);
        assert_eq!(argmax_first(&[f64::NAN, -1.0]), Some((1, -1.0)));
    }
}
