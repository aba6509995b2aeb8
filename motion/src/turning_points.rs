//! Prominence-gated peak and valley detection.
//!
//! Heights are "larger is higher", so a peak is a raised hand and a valley a
//! lowered one. Local maxima follow the usual discrete definition: a sample
//! (or the middle of a flat run) strictly greater than both neighbours;
//! endpoints never qualify. A maximum's prominence is its height above the
//! higher of the two lowest points reachable on each side before meeting
//! something taller (or the edge of the signal).

use serde::{Deserialize, Serialize};

/// Direction of a turning point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurningKind {
    Peak,
    Valley,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningPoint {
    pub timestamp: f64,
    pub kind: TurningKind,
}

/// Indices of local maxima. Flat tops report their (left-biased) midpoint.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Prominence of the sample at `peak`.
pub fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_min = height;
    for &v in values[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &values[peak + 1..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

/// Local maxima whose prominence is at least `min_prominence`.
pub fn find_peaks(values: &[f64], min_prominence: f64) -> Vec<usize> {
    local_maxima(values)
        .into_iter()
        .filter(|&i| prominence(values, i) >= min_prominence)
        .collect()
}

/// Peaks and valleys of a uniformly sampled signal, merged in time order.
pub fn detect(timestamps: &[f64], values: &[f64], min_prominence: f64) -> Vec<TurningPoint> {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();

    let peaks = find_peaks(values, min_prominence)
        .into_iter()
        .map(|i| (i, TurningKind::Peak));
    let valleys = find_peaks(&negated, min_prominence)
        .into_iter()
        .map(|i| (i, TurningKind::Valley));

    let mut merged: Vec<(usize, TurningKind)> = peaks.chain(valleys).collect();
    merged.sort_by_key(|(i, _)| *i);

    merged
        .into_iter()
        .map(|(i, kind)| TurningPoint {
            timestamp: timestamps[i],
            kind,
        })
        .collect()
}

/// Drop a leading valley: a bob is read as starting from the raised hand.
pub fn trim_leading_valley(points: &mut Vec<TurningPoint>) {
    if points.first().map(|p| p.kind) == Some(TurningKind::Valley) {
        points.remove(0);
    }
}

/// True if no two neighbours share a kind.
pub fn is_alternating(points: &[TurningPoint]) -> bool {
    points.windows(2).all(|w| w[0].kind != w[1].kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tp(timestamp: f64, kind: TurningKind) -> TurningPoint {
        TurningPoint { timestamp, kind }
    }

    #[test]
    fn test_local_maxima() {
        assert_eq!(local_maxima(&[0.0, 1.0, 0.0, 2.0, 1.0]), vec![1, 3]);
        // endpoints never count
        assert!(local_maxima(&[3.0, 2.0, 1.0, 2.0, 3.0]).is_empty());
        // flat top reports its midpoint
        assert_eq!(local_maxima(&[0.0, 1.0, 1.0, 1.0, 0.0]), vec![2]);
        assert_eq!(local_maxima(&[0.0, 1.0, 1.0, 0.0]), vec![1]);
        // a shoulder that keeps rising is not a maximum
        assert!(local_maxima(&[0.0, 1.0, 1.0, 2.0]).is_empty());
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_prominence() {
        let x = [0.0, 2.0, 1.0, 3.0, 0.5, 1.5, 0.0];
        // bounded on the right by the taller 3.0
        assert_abs_diff_eq!(prominence(&x, 1), 1.0);
        // tallest peak: lowest point on each side is 0.0
        assert_abs_diff_eq!(prominence(&x, 3), 3.0);
        assert_abs_diff_eq!(prominence(&x, 5), 1.0);
    }

    #[test]
    fn test_jitter_rejected_by_prominence() {
        let x = [0.5, 0.52, 0.5, 0.9, 0.5, 0.51, 0.5];
        assert_eq!(local_maxima(&x).len(), 3);
        assert_eq!(find_peaks(&x, 0.3), vec![3]);
    }

    #[test]
    fn test_detect_merges_in_time_order() {
        let ts: Vec<f64> = (0..9).map(|i| i as f64 * 0.1).collect();
        let ys = [0.5, 1.0, 0.5, 0.0, 0.5, 1.0, 0.5, 0.0, 0.5];
        let points = detect(&ts, &ys, 0.3);

        let kinds: Vec<_> = points.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TurningKind::Peak,
                TurningKind::Valley,
                TurningKind::Peak,
                TurningKind::Valley
            ]
        );
        assert_abs_diff_eq!(points[0].timestamp, 0.1);
        assert_abs_diff_eq!(points[3].timestamp, 0.7);
    }

    #[test]
    fn test_trim_leading_valley() {
        let mut points = vec![tp(0.0, TurningKind::Valley), tp(0.5, TurningKind::Peak)];
        trim_leading_valley(&mut points);
        assert_eq!(points, vec![tp(0.5, TurningKind::Peak)]);

        trim_leading_valley(&mut points);
        assert_eq!(points.len(), 1);

        let mut empty = Vec::new();
        trim_leading_valley(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_alternation() {
        assert!(is_alternating(&[]));
        assert!(is_alternating(&[tp(0.0, TurningKind::Peak)]));
        assert!(is_alternating(&[
            tp(0.0, TurningKind::Peak),
            tp(0.5, TurningKind::Valley),
            tp(1.0, TurningKind::Peak),
        ]));
        assert!(!is_alternating(&[
            tp(0.0, TurningKind::Peak),
            tp(0.5, TurningKind::Peak),
        ]));
    }
}
