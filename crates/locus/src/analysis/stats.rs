//! Small descriptive statistics over `f64` samples.
//!
//! Every function returns `None` when the statistic is undefined: too few
//! samples, samples of different lengths, or zero variance.

use std::collections::HashMap;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Centered cross and squared sums of two paired samples.
fn moments(x: &[f64], y: &[f64]) -> Option<(f64, f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    Some((sxy, sxx, syy))
}

/// Slope of the ordinary least squares fit of `y` on `x` (with intercept).
///
/// ```
/// use locus::analysis::ols_slope;
///
/// assert_eq!(ols_slope(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 40.0]), Some(10.0));
/// ```
pub fn ols_slope(x: &[f64], y: &[f64]) -> Option<f64> {
    let (sxy, sxx, _) = moments(x, y)?;
    (sxx > 0.0).then(|| sxy / sxx)
}

/// Pearson correlation coefficient.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let (sxy, sxx, syy) = moments(x, y)?;
    let denom = (sxx * syy).sqrt();
    (denom > 0.0).then(|| sxy / denom)
}

/// Count occurrences, keeping keys in first-seen order.
pub fn tally<'a, I>(items: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for item in items {
        match positions.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(item, counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts
}

/// Keys ordered by descending count; equal counts keep first-seen order.
pub fn most_common_first_seen<'a, I>(items: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = tally(items);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(key, _)| key).collect()
}

/// Keys ordered by descending count; equal counts are ordered alphabetically.
pub fn most_common_alphabetical<'a, I>(items: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = tally(items);
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts.into_iter().map(|(key, _)| key).collect()
}

/// Every key sharing the highest count, sorted alphabetically.
pub fn modes<'a, I>(items: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let counts = tally(items);
    let Some(max) = counts.iter().map(|(_, n)| *n).max() else {
        return Vec::new();
    };
    let mut keys: Vec<_> = counts
        .into_iter()
        .filter(|(_, n)| *n == max)
        .map(|(key, _)| key)
        .collect();
    keys.sort_unstable();
    keys
}
