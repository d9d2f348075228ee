use mutsim_core::equilibrium::stationarity_residual;
use mutsim_core::{
    build_transition_matrix, compute_equilibrium, iterate_chain, lu_decompose, multiply,
    run_simulation, solve_by_lu, substitute, ChainSettings, MatrixError, Triangle,
};
use nalgebra::{DMatrix, DVector};

fn allele_rates() -> DMatrix<f64> {
    DMatrix::from_row_slice(
        4,
        4,
        &[
            0.0, 0.01, 0.005, 0.03, //
            0.02, 0.0, 0.01, 0.01, //
            0.001, 0.03, 0.0, 0.2, //
            0.0, 0.1, 0.2, 0.0,
        ],
    )
}

/// Deterministic pseudo-random rates with off-diagonal row sums below one.
fn scrambled_rates(n: usize, seed: u64) -> DMatrix<f64> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64) / ((1u64 << 53) as f64)
    };
    let mut raw = DMatrix::from_fn(n, n, |_, _| next());
    for i in 0..n {
        raw[(i, i)] = 0.0;
        let total: f64 = raw.row(i).sum();
        let budget = 0.5 * next();
        for j in 0..n {
            raw[(i, j)] *= budget / total;
        }
    }
    raw
}

#[test]
fn builder_rows_sum_to_one_for_random_rates() {
    for seed in 1..20 {
        let m = build_transition_matrix(&scrambled_rates(6, seed)).unwrap();
        for sum in m.row_sums() {
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert!(m.as_matrix().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}

#[test]
fn equilibrium_sums_to_one_for_random_chains() {
    for seed in 1..20 {
        let m = build_transition_matrix(&scrambled_rates(5, seed)).unwrap();
        let eq = compute_equilibrium(&m, &[0.2; 5]).unwrap();
        assert!((eq.iter().sum::<f64>() - 1.0).abs() < 1e-10);
        assert!(eq.iter().all(|&v| v > -1e-12));
        assert!(stationarity_residual(&m, &eq).unwrap() < 1e-10);
    }
}

#[test]
fn untouched_allele_keeps_initial_frequency() {
    let mut raw = allele_rates().insert_row(4, 0.0).insert_column(4, 0.0);
    raw[(4, 4)] = 0.0;
    let m = build_transition_matrix(&raw).unwrap();
    let initial = [0.3, 0.25, 0.15, 0.1, 0.2];
    let eq = compute_equilibrium(&m, &initial).unwrap();
    assert_eq!(eq[4], 0.2);
    assert!((eq.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn chain_approaches_equilibrium_as_budget_grows() {
    let m = build_transition_matrix(&allele_rates()).unwrap();
    let initial = [0.4, 0.3, 0.2, 0.1];
    let eq = compute_equilibrium(&m, &initial).unwrap();

    let distance = |max_iter: usize| {
        let settings = ChainSettings {
            tolerance: 0.0,
            relative_tolerance: 0.0,
            max_iter,
        };
        let trajectory = iterate_chain(&initial, &m, settings).unwrap();
        trajectory
            .last()
            .unwrap()
            .iter()
            .zip(&eq)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    };

    let short = distance(10);
    let medium = distance(100);
    let long = distance(2_000);
    assert!(medium < short);
    assert!(long < medium);
    assert!(long < 1e-9);
}

#[test]
fn default_simulation_of_the_allele_example() {
    let result = run_simulation(&[0.4, 0.3, 0.2, 0.1], &allele_rates(), ChainSettings::default())
        .unwrap();
    assert!(result.trajectory.converged);
    assert_eq!(
        result.trajectory.generations.len(),
        result.trajectory.iterations + 1
    );
    for (a, b) in result.trajectory.last().unwrap().iter().zip(&result.equilibrium) {
        assert!((a - b).abs() < 1e-3);
    }

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"equilibrium\""));
}

#[test]
fn lu_pipeline_on_the_tridiagonal_example() {
    let a = DMatrix::from_row_slice(
        5,
        5,
        &[
            2.0, 1.0, 0.0, 0.0, 0.0, //
            4.0, 3.0, 1.0, 0.0, 0.0, //
            0.0, 2.0, 3.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, 4.0, 2.0, //
            0.0, 0.0, 0.0, 1.0, 5.0,
        ],
    );
    let b = [1.0, 4.0, 10.0, 18.0, 19.0];

    let factors = lu_decompose(&a).unwrap();
    let rebuilt = factors.reconstruct();
    for (x, y) in rebuilt.iter().zip(a.iter()) {
        assert!((x - y).abs() < 1e-12);
    }

    let y = substitute(&factors.lower, &b, Triangle::Lower).unwrap();
    let x = substitute(&factors.upper, &y, Triangle::Upper).unwrap();
    assert_eq!(x, solve_by_lu(&a, &b).unwrap());

    let ax = &a * DVector::from_column_slice(&x);
    for (lhs, rhs) in ax.iter().zip(b) {
        assert!((lhs - rhs).abs() < 1e-10);
    }
}

#[test]
fn multiply_signals_invalid_dimensions() {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -2.0]);
    let b = DMatrix::from_row_slice(
        4,
        4,
        &[
            2.0, 0.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, 0.0, //
            0.0, 0.0, -4.0, 0.0, //
            0.0, 0.0, 0.0, 5.0,
        ],
    );
    assert!(matches!(
        multiply(&a, &b),
        Err(MatrixError::DimensionMismatch { .. })
    ));

    let top = b.rows(0, 2).into_owned();
    let product = multiply(&a, &top).unwrap();
    assert_eq!(
        product,
        DMatrix::from_row_slice(2, 4, &[2.0, 0.0, 0.0, 0.0, 0.0, -6.0, 0.0, 0.0])
    );
}
