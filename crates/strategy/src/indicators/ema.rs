/// Exponential Moving Average with smoothing factor `alpha = 2 / (span + 1)`.
///
/// The first output value equals the first input value — there is no SMA
/// seeding window, so every bar from the first onward has a defined EMA.
/// Early values are warm-up quality and less reliable than later ones.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    assert!(span >= 1, "EMA span must be >= 1");

    let mut out = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return out;
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut ema = first;
    out.push(ema);
    for &value in &values[1..] {
        ema = alpha * value + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_is_empty_for_empty_input() {
        assert!(ema_series(&[], 12).is_empty());
    }

    #[test]
    fn ema_first_value_equals_first_close() {
        let values = vec![42.5, 43.0, 44.0];
        let ema = ema_series(&values, 12);
        assert_eq!(ema[0], 42.5);
        assert_eq!(ema.len(), values.len());
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let values = vec![100.0; 50];
        for &v in &ema_series(&values, 12) {
            assert!((v - 100.0).abs() < 1e-12, "EMA drifted from constant: {v}");
        }
    }

    #[test]
    fn ema_converges_to_constant_tail() {
        // A jump followed by a long constant tail — the EMA must approach
        // the tail value.
        let mut values = vec![50.0];
        values.extend(std::iter::repeat(100.0).take(200));
        let ema = ema_series(&values, 12);
        let last = *ema.last().unwrap();
        assert!((last - 100.0).abs() < 1e-6, "EMA did not converge: {last}");
    }

    #[test]
    fn ema_tracks_faster_with_smaller_span() {
        let mut values = vec![100.0; 10];
        values.extend(std::iter::repeat(110.0).take(5));
        let fast = ema_series(&values, 3);
        let slow = ema_series(&values, 20);
        assert!(fast.last().unwrap() > slow.last().unwrap());
    }
}
