use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spheresnap::simultaneous::{
    approximate_jointly, brute_force, jacobi_perron, lagarias_run, lll_approximate, GuaranteeMode,
    LllTarget,
};
use spheresnap::{PrecisionSpec, SnapError, StrategyFlags};

fn q(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

/// Coordinates with large prime denominators, so no small denominator is exact.
fn random_point(rng: &mut ChaCha8Rng, dim: usize) -> Vec<BigRational> {
    const PRIMES: [i64; 3] = [1009, 1013, 1019];
    (0..dim)
        .map(|i| {
            let den = PRIMES[i % PRIMES.len()];
            q(rng.gen_range(1..den), den)
        })
        .collect()
}

fn ratio(a: &BigRational, b: &BigRational) -> f64 {
    (a / b).to_f64().unwrap_or(f64::INFINITY)
}

#[test]
fn lattice_reduction_close_to_exhaustive_search() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for dim in [2usize, 3] {
        let factor = (5.0 * dim as f64).sqrt() * 2f64.powf((dim as f64 - 1.0) / 2.0);
        for _ in 0..6 {
            let xs = random_point(&mut rng, dim);
            for bound in [8i64, 32] {
                let bound = BigInt::from(bound);
                let lll = lagarias_run(&xs, &bound).unwrap();
                let oracle = brute_force(&xs, &bound).unwrap();
                let lll_dev = lll.max_deviation(&xs);
                let oracle_dev = oracle.max_deviation(&xs);
                assert!(!oracle_dev.is_zero());
                let r = ratio(&lll_dev, &oracle_dev);
                assert!(r <= factor, "dim {dim} bound {bound}: ratio {r} > {factor} for {xs:?}");
            }
        }
    }
}

#[test]
fn greedy_lattice_search_meets_target() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for dim in [2usize, 3] {
        let xs = random_point(&mut rng, dim);
        let eps = q(1, 1 << 12);
        let result = lll_approximate(&xs, &LllTarget::Greedy { epsilon: eps.clone() }, 64).unwrap();
        assert!(result.max_deviation(&xs) <= eps);
    }
}

#[test]
fn bounded_size_lattice_search_respects_denominator() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let precision = PrecisionSpec::MaxDenominator(BigInt::from(512));
    for dim in [2usize, 3] {
        let xs = random_point(&mut rng, dim);
        let flags = StrategyFlags::LLL | StrategyFlags::BOUNDED_SIZE;
        let result = approximate_jointly(&xs, flags, &precision, 64).unwrap();
        assert!(result.denominator <= BigInt::from(512), "dim {dim}: {}", result.denominator);
    }
}

#[test]
fn jacobi_perron_contracts() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    for _ in 0..20 {
        let xs = random_point(&mut rng, 2);

        let eps = q(1, 1024);
        let spec = PrecisionSpec::Epsilon(eps.clone());
        let close = jacobi_perron(&xs, &spec, GuaranteeMode::BoundedDistance).unwrap();
        assert!(close.max_deviation(&xs) <= eps);

        let max_den = BigInt::from(256);
        let spec = PrecisionSpec::MaxDenominator(max_den.clone());
        let small = jacobi_perron(&xs, &spec, GuaranteeMode::BoundedSize).unwrap();
        assert!(small.denominator <= max_den);
        // The oracle searches every denominator, so it can only do better.
        let oracle = brute_force(&xs, &max_den).unwrap();
        assert!(oracle.max_deviation(&xs) <= small.max_deviation(&xs));
    }
}

#[test]
fn jacobi_perron_needs_two_coordinates() {
    let spec = PrecisionSpec::Significands(10);
    let err = approximate_jointly(&[q(1, 3)], StrategyFlags::JACOBI_PERRON, &spec, 8);
    assert!(matches!(err, Err(SnapError::DimensionMismatch { found: 1, .. })));
}

#[test]
fn dispatch_selects_requested_strategy() {
    let xs = [q(1, 3), q(2, 7)];
    let spec = PrecisionSpec::Significands(4);

    let oracle = approximate_jointly(&xs, StrategyFlags::BRUTE_FORCE, &spec, 8).unwrap();
    assert_eq!(oracle, brute_force(&xs, &BigInt::from(16)).unwrap());

    let fixed = approximate_jointly(&xs, StrategyFlags::LLL_FIXED, &spec, 8).unwrap();
    assert_eq!(fixed, lagarias_run(&xs, &BigInt::from(16)).unwrap());

    let scaled = approximate_jointly(&xs, StrategyFlags::LLL_SCALED, &spec, 8).unwrap();
    assert!(scaled.denominator > BigInt::zero());
}

#[test]
fn exact_shared_denominator_found_by_every_strategy() {
    let xs = [q(2, 11), q(-7, 11)];
    let spec = PrecisionSpec::Significands(8);
    for flags in [
        StrategyFlags::LLL,
        StrategyFlags::LLL_FIXED,
        StrategyFlags::BRUTE_FORCE,
        StrategyFlags::JACOBI_PERRON,
    ] {
        let result = approximate_jointly(&xs, flags, &spec, 32).unwrap();
        assert!(result.max_deviation(&xs).is_zero(), "{flags:?}");
    }
}
