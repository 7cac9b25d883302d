use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};
use spheresnap::interval::{continued_fraction, from_continued_fraction, within};

fn q(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

/// Every reduced fraction with denominator <= `max_den` in `[lo, hi]`.
fn fractions(lo: i64, hi: i64, max_den: i64) -> Vec<BigRational> {
    let mut out = Vec::new();
    for d in 1..=max_den {
        for n in lo * d..=hi * d {
            let f = q(n, d);
            if f.denom() == &BigInt::from(d) {
                out.push(f);
            }
        }
    }
    out.sort();
    out
}

/// Smallest denominator `<= limit` of any rational inside `[lo, hi]`.
fn smallest_denominator(lo: &BigRational, hi: &BigRational, limit: i64) -> Option<BigInt> {
    (1..=limit).map(BigInt::from).find(|d| {
        let scaled = lo * BigRational::from_integer(d.clone());
        let first = scaled.ceil();
        first / BigRational::from_integer(d.clone()) <= *hi
    })
}

#[test]
fn within_midpoint_of_sixteenths() {
    assert_eq!(within(&q(7, 16), &q(9, 16)), q(1, 2));
}

#[test]
fn within_is_minimal_exhaustive() {
    // Endpoints with denominators up to 9 in [-2, 2]; every rational with
    // denominator <= 50 is a candidate.
    let endpoints = fractions(-2, 2, 9);
    for (i, lo) in endpoints.iter().enumerate() {
        for hi in &endpoints[i..] {
            let found = within(lo, hi);
            assert!(&found >= lo && &found <= hi, "{found} outside [{lo}, {hi}]");
            let best = smallest_denominator(lo, hi, 50).expect("endpoint itself has a small denominator");
            assert_eq!(found.denom(), &best, "interval [{lo}, {hi}] gave {found}");
        }
    }
}

#[test]
fn within_minimal_on_narrow_intervals() {
    // Narrow intervals around fractions with denominators up to 50.
    let radius = q(1, 5000);
    for center in fractions(0, 1, 50) {
        let lo = &center - &radius;
        let hi = &center + &radius;
        let found = within(&lo, &hi);
        let best = smallest_denominator(&lo, &hi, 50).expect("center lies inside");
        assert_eq!(found.denom(), &best, "around {center}");
        assert!(found >= lo && found <= hi);
    }
}

#[test]
fn within_handles_order_and_sign() {
    let lo = q(-22, 7);
    let hi = q(-3, 1);
    assert_eq!(within(&lo, &hi), q(-3, 1));
    assert_eq!(within(&hi, &lo), q(-3, 1));
    assert_eq!(within(&q(-1, 100), &q(1, 100)), q(0, 1));
}

#[test]
fn within_result_is_reduced() {
    let found = within(&q(333, 1000), &q(334, 1000));
    assert_eq!(found, q(1, 3));
    assert!(found.denom().is_positive());
}

#[test]
fn continued_fraction_expansion_folds_back() {
    for (n, d) in [(415, 93), (-17, 5), (1, 1), (355, 113), (0, 1)] {
        let x = q(n, d);
        let terms = continued_fraction(&x);
        assert_eq!(from_continued_fraction(&terms), x, "{x}");
    }
}

#[test]
fn empty_expansion_is_zero() {
    assert_eq!(from_continued_fraction(&[]), q(0, 1));
    assert_eq!(from_continued_fraction(&[BigInt::one()]), q(1, 1));
}
