//! Differential evolution (`best1bin`) with linear constraints.
//!
//! Model
//! - Latin-hypercube initial population of `popsize × dims` members; `x0`
//!   (clipped into the box) replaces the first member.
//! - Each generation draws a dithered mutation factor and, member by member,
//!   builds `best + F·(r0 − r1)` with binomial crossover. Trials leaving the
//!   box are resampled uniformly per coordinate.
//! - Selection is feasibility-first: feasible beats infeasible, two feasible
//!   members compare by value, two infeasible ones by component-wise
//!   violation. Improvements replace the target immediately and may become
//!   the new best (slot 0).
//! - Stops after `maxiter` generations or once every member is feasible and
//!   `std(values) <= atol + tol·|mean(values)|`.
//!
//! Determinism: all randomness comes from one `StdRng` seeded with `cfg.seed`.

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::types::{LinearConstraint, MinimizeError, Minimizer, Minimum, Problem};

/// Differential-evolution configuration.
#[derive(Clone, Copy, Debug)]
pub struct DeCfg {
    /// Population size multiplier (members = `popsize × dims`, at least 5).
    pub popsize: usize,
    /// Maximum number of generations.
    pub maxiter: usize,
    /// Dithering range for the mutation factor, `[lo, hi)`.
    pub mutation: (f64, f64),
    /// Crossover probability.
    pub recombination: f64,
    pub tol: f64,
    pub atol: f64,
    pub seed: u64,
}

impl Default for DeCfg {
    fn default() -> Self {
        Self {
            popsize: 15,
            maxiter: 1000,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            tol: 0.01,
            atol: 0.0,
            seed: 0,
        }
    }
}

/// Population-based global minimizer.
#[derive(Clone, Debug, Default)]
pub struct DifferentialEvolution {
    pub cfg: DeCfg,
}

impl DifferentialEvolution {
    pub fn new(cfg: DeCfg) -> Self {
        Self { cfg }
    }
}

/// One evaluated population member.
#[derive(Clone, Debug)]
struct Member {
    x: DVector<f64>,
    value: f64,
    violation: DVector<f64>,
}

impl Member {
    #[inline]
    fn feasible(&self) -> bool {
        self.violation.iter().all(|&v| v <= 0.0)
    }

    #[inline]
    fn total_violation(&self) -> f64 {
        self.violation.sum()
    }

    /// Feasibility-first replacement rule: should `self` replace `other`?
    fn beats(&self, other: &Member) -> bool {
        match (self.feasible(), other.feasible()) {
            (true, true) => self.value <= other.value,
            (true, false) => true,
            (false, true) => false,
            (false, false) => self
                .violation
                .iter()
                .zip(other.violation.iter())
                .all(|(a, b)| a <= b),
        }
    }
}

struct Runner<'a> {
    objective: &'a dyn Fn(&DVector<f64>) -> f64,
    constraints: Option<&'a LinearConstraint>,
    lo: DVector<f64>,
    hi: DVector<f64>,
    rng: StdRng,
    evaluations: usize,
}

impl<'a> Runner<'a> {
    fn evaluate(&mut self, x: DVector<f64>) -> Member {
        let violation = match self.constraints {
            Some(c) => c.violation(&x),
            None => DVector::zeros(0),
        };
        let feasible = violation.iter().all(|&v| v <= 0.0);
        // Infeasible members are never compared by value.
        let value = if feasible {
            self.evaluations += 1;
            (self.objective)(&x)
        } else {
            f64::INFINITY
        };
        Member {
            x,
            value,
            violation,
        }
    }

    fn latin_hypercube(&mut self, members: usize) -> Vec<DVector<f64>> {
        let dims = self.lo.len();
        let seg = 1.0 / members as f64;
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(dims);
        for _ in 0..dims {
            let mut col: Vec<f64> = (0..members)
                .map(|m| (m as f64 + self.rng.gen::<f64>()) * seg)
                .collect();
            col.shuffle(&mut self.rng);
            columns.push(col);
        }
        (0..members)
            .map(|m| DVector::from_fn(dims, |d, _| self.scale(d, columns[d][m])))
            .collect()
    }

    #[inline]
    fn scale(&self, d: usize, unit: f64) -> f64 {
        self.lo[d] + unit * (self.hi[d] - self.lo[d])
    }

    #[inline]
    fn in_box(&self, d: usize, v: f64) -> bool {
        v >= self.lo[d] && v <= self.hi[d]
    }

    /// Index of the best member under the feasibility-first order.
    fn best_index(pop: &[Member]) -> usize {
        let mut best = 0;
        for (i, m) in pop.iter().enumerate().skip(1) {
            let b = &pop[best];
            let better = match (m.feasible(), b.feasible()) {
                (true, true) => m.value < b.value,
                (true, false) => true,
                (false, true) => false,
                (false, false) => m.total_violation() < b.total_violation(),
            };
            if better {
                best = i;
            }
        }
        best
    }

    /// Two distinct indices, both different from `exclude`.
    fn pick_two(&mut self, n: usize, exclude: usize) -> (usize, usize) {
        let mut r0 = self.rng.gen_range(0..n);
        while r0 == exclude {
            r0 = self.rng.gen_range(0..n);
        }
        let mut r1 = self.rng.gen_range(0..n);
        while r1 == exclude || r1 == r0 {
            r1 = self.rng.gen_range(0..n);
        }
        (r0, r1)
    }

    fn converged(pop: &[Member], tol: f64, atol: f64) -> bool {
        if !pop.iter().all(Member::feasible) {
            return false;
        }
        let n = pop.len() as f64;
        let mean = pop.iter().map(|m| m.value).sum::<f64>() / n;
        let var = pop.iter().map(|m| (m.value - mean).powi(2)).sum::<f64>() / n;
        var.sqrt() <= atol + tol * mean.abs()
    }
}

impl Minimizer for DifferentialEvolution {
    fn minimize(
        &mut self,
        objective: &dyn Fn(&DVector<f64>) -> f64,
        problem: &Problem,
    ) -> Result<Minimum, MinimizeError> {
        problem.check()?;
        let cfg = self.cfg;
        let dims = problem.dims();
        let members = (cfg.popsize * dims).max(5);
        let mut run = Runner {
            objective,
            constraints: problem.constraints.as_ref(),
            lo: DVector::from_iterator(dims, problem.bounds.iter().map(|b| b.0)),
            hi: DVector::from_iterator(dims, problem.bounds.iter().map(|b| b.1)),
            rng: StdRng::seed_from_u64(cfg.seed),
            evaluations: 0,
        };

        let mut xs = run.latin_hypercube(members);
        if let Some(x0) = &problem.x0 {
            xs[0] = DVector::from_fn(dims, |d, _| x0[d].clamp(run.lo[d], run.hi[d]));
        }
        let mut pop: Vec<Member> = xs.into_iter().map(|x| run.evaluate(x)).collect();
        let best = Runner::best_index(&pop);
        pop.swap(0, best);

        let mut generations = 0;
        let mut converged = Runner::converged(&pop, cfg.tol, cfg.atol);
        while !converged && generations < cfg.maxiter {
            generations += 1;
            let (mlo, mhi) = cfg.mutation;
            let f = if mhi > mlo {
                run.rng.gen_range(mlo..mhi)
            } else {
                mlo
            };
            for i in 0..members {
                let (r0, r1) = run.pick_two(members, i);
                let fill = run.rng.gen_range(0..dims);
                let mut trial = pop[i].x.clone();
                for d in 0..dims {
                    if d == fill || run.rng.gen::<f64>() < cfg.recombination {
                        trial[d] = pop[0].x[d] + f * (pop[r0].x[d] - pop[r1].x[d]);
                    }
                }
                for d in 0..dims {
                    if !run.in_box(d, trial[d]) {
                        let u = run.rng.gen::<f64>();
                        trial[d] = run.scale(d, u);
                    }
                }
                let cand = run.evaluate(trial);
                if cand.beats(&pop[i]) {
                    pop[i] = cand;
                    if i != 0 && pop[i].beats(&pop[0]) {
                        pop.swap(0, i);
                    }
                }
            }
            converged = Runner::converged(&pop, cfg.tol, cfg.atol);
        }

        let best = &pop[0];
        debug!(
            generations,
            evaluations = run.evaluations,
            value = best.value,
            feasible = best.feasible(),
            converged,
            "differential evolution finished"
        );
        Ok(Minimum {
            x: best.x.clone(),
            value: best.value,
            feasible: best.feasible(),
            generations,
            evaluations: run.evaluations,
            converged,
        })
    }
}
