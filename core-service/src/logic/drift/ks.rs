//! Two-sample Kolmogorov-Smirnov test
//!
//! Statistic over the merged empirical CDFs; asymptotic p-value from the
//! Kolmogorov distribution with Stephens' small-sample correction.

const SERIES_EPS_TERM: f64 = 0.001;
const SERIES_EPS_SUM: f64 = 1e-8;
const SERIES_MAX_TERMS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// `sup |F_a(x) - F_b(x)|`. Both inputs must be non-empty and finite.
pub fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d: f64 = 0.0;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        // Step past every tie at x in both samples before comparing
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / n1 - j as f64 / n2).abs());
    }
    d
}

/// Kolmogorov survival function `Q(λ) = 2 Σ (-1)^(j-1) exp(-2 j² λ²)`.
/// Returns 1 when the series fails to converge (λ near 0).
pub fn kolmogorov_q(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0;

    for j in 1..=SERIES_MAX_TERMS {
        let j = j as f64;
        let term = fac * (a2 * j * j).exp();
        sum += term;
        if term.abs() <= SERIES_EPS_TERM * previous || term.abs() <= SERIES_EPS_SUM * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        previous = term.abs();
    }
    1.0
}

pub fn ks_p_value(statistic: f64, n1: usize, n2: usize) -> f64 {
    let (n1, n2) = (n1 as f64, n2 as f64);
    let en = (n1 * n2 / (n1 + n2)).sqrt();
    kolmogorov_q((en + 0.12 + 0.11 / en) * statistic)
}

pub fn ks_2samp(a: &[f64], b: &[f64]) -> KsResult {
    let statistic = ks_statistic(a, b);
    KsResult {
        statistic,
        p_value: ks_p_value(statistic, a.len(), b.len()),
    }
}
