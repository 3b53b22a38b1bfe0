use super::ema::ema_series;

/// MACD series: `macd = EMA(fast) - EMA(slow)`, `signal = EMA(macd,
/// signal_span)`, `histogram = macd - signal`. All three are aligned to the
/// input and defined wherever both EMAs are defined.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_series(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    assert!(fast < slow, "MACD fast span must be less than slow span");

    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);

    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_series(&macd, signal_span);
    let histogram: Vec<f64> = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}
