use super::*;
use nalgebra::{dmatrix, dvector, DVector};

fn unconstrained(bounds: Vec<(f64, f64)>) -> Problem {
    Problem {
        bounds,
        constraints: None,
        x0: None,
    }
}

#[test]
fn minimizes_shifted_sphere() {
    let f = |x: &DVector<f64>| (x[0] - 1.5).powi(2) + (x[1] + 0.5).powi(2);
    let mut de = DifferentialEvolution::new(DeCfg {
        seed: 7,
        tol: 1e-8,
        ..DeCfg::default()
    });
    let m = de
        .minimize(&f, &unconstrained(vec![(-5.0, 5.0), (-5.0, 5.0)]))
        .unwrap();
    assert!(m.feasible);
    assert!((m.x[0] - 1.5).abs() < 1e-2, "x = {}", m.x);
    assert!((m.x[1] + 0.5).abs() < 1e-2, "x = {}", m.x);
    assert!(m.value < 1e-3);
    assert!(m.evaluations > 0);
}

#[test]
fn respects_ordering_constraint() {
    // Unconstrained optimum (8, 2) violates x0 - x1 <= -1; constrained optimum lies on x1 = x0 + 1.
    let f = |x: &DVector<f64>| (x[0] - 8.0).powi(2) + (x[1] - 2.0).powi(2);
    let problem = Problem {
        bounds: vec![(0.0, 10.0), (0.0, 10.0)],
        constraints: Some(LinearConstraint {
            a: dmatrix![1.0, -1.0],
            lb: dvector![f64::NEG_INFINITY],
            ub: dvector![-1.0],
        }),
        x0: None,
    };
    let mut de = DifferentialEvolution::new(DeCfg {
        seed: 3,
        tol: 1e-6,
        ..DeCfg::default()
    });
    let m = de.minimize(&f, &problem).unwrap();
    assert!(m.feasible);
    assert!(m.x[0] - m.x[1] <= -1.0 + 1e-12);
    // Projection of (8, 2) onto x1 >= x0 + 1 is (4.5, 5.5).
    assert!((m.x[0] - 4.5).abs() < 0.05, "x = {}", m.x);
    assert!((m.x[1] - 5.5).abs() < 0.05, "x = {}", m.x);
}

#[test]
fn same_seed_same_result() {
    let f = |x: &DVector<f64>| (x[0] * 3.0).sin() + (x[1] - 0.3).abs() + x[2].floor();
    let problem = unconstrained(vec![(-2.0, 2.0); 3]);
    let run = |seed| {
        DifferentialEvolution::new(DeCfg {
            seed,
            maxiter: 50,
            ..DeCfg::default()
        })
        .minimize(&f, &problem)
        .unwrap()
    };
    let (a, b) = (run(11), run(11));
    assert_eq!(a.x, b.x);
    assert_eq!(a.generations, b.generations);
    assert_eq!(a.evaluations, b.evaluations);
}

#[test]
fn perfect_initial_guess_converges_immediately_on_flat_objective() {
    let f = |_: &DVector<f64>| 0.0;
    let problem = Problem {
        bounds: vec![(0.0, 1.0)],
        constraints: None,
        x0: Some(dvector![0.25]),
    };
    let m = DifferentialEvolution::default().minimize(&f, &problem).unwrap();
    assert!(m.converged);
    assert_eq!(m.generations, 0);
    assert_eq!(m.x, dvector![0.25]);
}

#[test]
fn initial_guess_is_clipped_into_box() {
    let f = |x: &DVector<f64>| x[0];
    let problem = Problem {
        bounds: vec![(0.0, 1.0)],
        constraints: None,
        x0: Some(dvector![-3.0]),
    };
    let m = DifferentialEvolution::new(DeCfg {
        maxiter: 0,
        ..DeCfg::default()
    })
    .minimize(&f, &problem)
    .unwrap();
    // The clipped guess (0.0) is the best member of the initial population.
    assert_eq!(m.x, dvector![0.0]);
}

#[test]
fn malformed_problems_are_rejected() {
    let f = |_: &DVector<f64>| 0.0;
    let mut de = DifferentialEvolution::default();
    assert_eq!(
        de.minimize(&f, &unconstrained(vec![])).unwrap_err(),
        MinimizeError::EmptyProblem
    );
    assert!(matches!(
        de.minimize(&f, &unconstrained(vec![(1.0, 0.0)])),
        Err(MinimizeError::InvalidBounds { dim: 0, .. })
    ));
    let bad_x0 = Problem {
        bounds: vec![(0.0, 1.0)],
        constraints: None,
        x0: Some(dvector![0.1, 0.2]),
    };
    assert!(matches!(
        de.minimize(&f, &bad_x0),
        Err(MinimizeError::DimensionMismatch { what: "x0", .. })
    ));
}

#[test]
fn violation_is_componentwise() {
    let c = LinearConstraint {
        a: dmatrix![1.0, -1.0, 0.0; 0.0, 1.0, -1.0],
        lb: dvector![f64::NEG_INFINITY, f64::NEG_INFINITY],
        ub: dvector![-1.0, -1.0],
    };
    let v = c.violation(&dvector![3.0, 2.0, 5.0]);
    assert_eq!(v, dvector![2.0, 0.0]);
}
