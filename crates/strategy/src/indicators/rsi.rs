/// RSI (Relative Strength Index) with Wilder smoothing.
///
/// `avg_gain`/`avg_loss` are seeded with the simple mean of the first
/// `period` deltas and then exponentially smoothed with `alpha = 1/period`.
/// Output is `None` until `period` deltas exist — warm-up bars are
/// undefined, not zero.
///
/// Flat-market convention: when both averages are zero the RSI is 50.
/// When only the loss average is zero the RSI is 100.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    assert!(period >= 2, "RSI period must be >= 2");

    let mut out = vec![None; closes.len()];
    if closes.len() < period + 1 {
        return out;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = deltas[..period]
        .iter()
        .map(|&d| d.max(0.0))
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = deltas[..period]
        .iter()
        .map(|&d| (-d).max(0.0))
        .sum::<f64>()
        / period as f64;

    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for (i, &delta) in deltas.iter().enumerate().skip(period) {
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        // delta i sits between bars i and i+1
        out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
