// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! Reference selection and error comparison for the Euler family solvers.
//!
//! The reference curve is the exact solution g(x_i) when one is supplied, otherwise the AIME
//! trajectory. Every method gets a pointwise absolute error series |y_i - ref_i|; all
//! trajectories share the same x-nodes because they are built on the same [`StepGrid`].
use crate::numerical::Euler_family::{EulerError, EulerMethod, StepGrid, Trajectory};
use crate::numerical::ode_functions::ExactSolution;
use nalgebra::DVector;
use std::collections::BTreeMap;
use strum_macros::Display;
use tabled::{builder::Builder, settings::Style};

/// Trajectories of one run keyed by method; a failed method keeps its error and never
/// affects its siblings
pub type MethodResults = BTreeMap<EulerMethod, Result<Trajectory, EulerError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReferenceSource {
    #[strum(to_string = "Exact Solution")]
    Exact,
    #[strum(to_string = "AIME (Reference)")]
    AIME,
}

/// y-values treated as ground truth, aligned with the trajectories' x-nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    source: ReferenceSource,
    x: DVector<f64>,
    y: DVector<f64>,
}

impl ReferenceCurve {
    pub fn source(&self) -> ReferenceSource {
        self.source
    }

    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Choose the ground truth once all trajectories exist.
/// The exact solution is sampled on the grid nodes, which are the AIME trajectory's x-sequence.
pub fn select_reference(
    grid: &StepGrid,
    trajectories: &MethodResults,
    exact: Option<&dyn ExactSolution>,
) -> Result<ReferenceCurve, EulerError> {
    match exact {
        Some(g) => {
            let x = grid.nodes();
            let mut y = DVector::zeros(x.len());
            for (i, &x_i) in x.iter().enumerate() {
                let value = g.eval(x_i);
                if !value.is_finite() {
                    return Err(EulerError::NonFiniteReference { x: x_i });
                }
                y[i] = value;
            }
            Ok(ReferenceCurve {
                source: ReferenceSource::Exact,
                x,
                y,
            })
        }
        None => match trajectories.get(&EulerMethod::AIME) {
            Some(Ok(aime)) => Ok(ReferenceCurve {
                source: ReferenceSource::AIME,
                x: aime.x().clone(),
                y: aime.y().clone(),
            }),
            Some(Err(e)) => Err(EulerError::ReferenceUnavailable(format!(
                "AIME trajectory failed: {}",
                e
            ))),
            None => Err(EulerError::ReferenceUnavailable(
                "AIME was not computed and no exact solution was given".to_string(),
            )),
        },
    }
}

/// Summary of one error series (used by the single-method report)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStatistics {
    pub max: f64,
    pub final_error: f64,
    pub mean: f64,
}

/// |y_i - ref_i| for one method
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSeries {
    method: EulerMethod,
    x: DVector<f64>,
    error: DVector<f64>,
}

impl ErrorSeries {
    pub fn method(&self) -> EulerMethod {
        self.method
    }

    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn error(&self) -> &DVector<f64> {
        &self.error
    }

    pub fn len(&self) -> usize {
        self.error.len()
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_empty()
    }

    pub fn statistics(&self) -> ErrorStatistics {
        let n = self.error.len();
        let max = self.error.iter().copied().fold(0.0_f64, f64::max);
        let final_error = self.error[n - 1];
        let mean = self.error.sum() / n as f64;
        ErrorStatistics {
            max,
            final_error,
            mean,
        }
    }
}

pub fn error_series(
    trajectory: &Trajectory,
    reference: &ReferenceCurve,
) -> Result<ErrorSeries, EulerError> {
    if trajectory.len() != reference.len() {
        return Err(EulerError::LengthMismatch {
            method: trajectory.method(),
            expected: reference.len(),
            found: trajectory.len(),
        });
    }
    let error = trajectory
        .y()
        .zip_map(reference.y(), |y, y_ref| (y - y_ref).abs());
    Ok(ErrorSeries {
        method: trajectory.method(),
        x: trajectory.x().clone(),
        error,
    })
}

/// Checks that a trajectory was computed on `grid`: n + 1 points on the nodes x0 + i h
pub fn check_on_grid(grid: &StepGrid, trajectory: &Trajectory) -> Result<(), EulerError> {
    if trajectory.len() != grid.n + 1 {
        return Err(EulerError::LengthMismatch {
            method: trajectory.method(),
            expected: grid.n + 1,
            found: trajectory.len(),
        });
    }
    for (i, &x) in trajectory.x().iter().enumerate() {
        let node = grid.node(i);
        if (x - node).abs() > 1e-12 * node.abs().max(1.0) {
            return Err(EulerError::NodeMismatch {
                method: trajectory.method(),
                index: i,
                expected: node,
                found: x,
            });
        }
    }
    Ok(())
}

/// error series of every successful trajectory; failed methods are skipped
pub fn compare(
    trajectories: &MethodResults,
    reference: &ReferenceCurve,
) -> Result<BTreeMap<EulerMethod, ErrorSeries>, EulerError> {
    let mut errors = BTreeMap::new();
    for (method, trajectory) in trajectories.iter() {
        if let Ok(trajectory) = trajectory {
            errors.insert(*method, error_series(trajectory, reference)?);
        }
    }
    Ok(errors)
}

/// Everything one comparison run produces
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub grid: StepGrid,
    pub trajectories: MethodResults,
    pub reference: Result<ReferenceCurve, EulerError>,
    pub errors: BTreeMap<EulerMethod, ErrorSeries>,
}

impl ComparisonReport {
    pub fn new(
        grid: StepGrid,
        trajectories: MethodResults,
        exact: Option<&dyn ExactSolution>,
    ) -> Result<ComparisonReport, EulerError> {
        for trajectory in trajectories.values().filter_map(|t| t.as_ref().ok()) {
            check_on_grid(&grid, trajectory)?;
        }
        let reference = select_reference(&grid, &trajectories, exact);
        let errors = match &reference {
            Ok(reference) => compare(&trajectories, reference)?,
            Err(_) => BTreeMap::new(),
        };
        Ok(ComparisonReport {
            grid,
            trajectories,
            reference,
            errors,
        })
    }

    pub fn trajectory(&self, method: EulerMethod) -> Option<&Trajectory> {
        self.trajectories.get(&method).and_then(|t| t.as_ref().ok())
    }

    pub fn failures(&self) -> Vec<(EulerMethod, &EulerError)> {
        self.trajectories
            .iter()
            .filter_map(|(method, t)| t.as_ref().err().map(|e| (*method, e)))
            .collect()
    }

    /// x | y of every method | reference
    pub fn comparison_table(&self) -> String {
        let mut builder = Builder::default();
        let mut header = vec!["x".to_string()];
        header.extend(self.trajectories.keys().map(|m| m.to_string()));
        if let Ok(reference) = &self.reference {
            header.push(reference.source().to_string());
        }
        builder.push_record(header);

        for i in 0..=self.grid.n {
            let mut row = vec![format!("{:.4}", self.grid.node(i))];
            for trajectory in self.trajectories.values() {
                row.push(match trajectory {
                    Ok(t) => format!("{:.6}", t.y()[i]),
                    Err(_) => "failed".to_string(),
                });
            }
            if let Ok(reference) = &self.reference {
                row.push(format!("{:.6}", reference.y()[i]));
            }
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }

    /// x | absolute error of every method
    pub fn error_table(&self) -> String {
        let mut builder = Builder::default();
        let mut header = vec!["x".to_string()];
        header.extend(self.errors.keys().map(|m| format!("{} Error", m)));
        builder.push_record(header);
        for i in 0..=self.grid.n {
            let mut row = vec![format!("{:.4}", self.grid.node(i))];
            row.extend(self.errors.values().map(|e| format!("{:.6e}", e.error()[i])));
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }

    /// per-method listing of the final results: x with 3 decimals, y with 6
    pub fn final_results(&self) -> String {
        let mut out = String::new();
        for (method, trajectory) in self.trajectories.iter() {
            out.push_str(&format!("\n{}:\n", method));
            match trajectory {
                Ok(t) => {
                    let mut builder = Builder::default();
                    builder.push_record(vec!["x".to_string(), "y".to_string()]);
                    for (x, y) in t.points() {
                        builder.push_record(vec![format!("{:.3}", x), format!("{:.6}", y)]);
                    }
                    let mut table = builder.build();
                    table.with(Style::modern_rounded());
                    out.push_str(&table.to_string());
                    out.push('\n');
                }
                Err(e) => out.push_str(&format!("failed: {}\n", e)),
            }
        }
        out
    }
}

/// One method with an optional exact solution: numerical y, exact y, absolute error and
/// error statistics
#[derive(Debug, Clone)]
pub struct SingleMethodReport {
    pub trajectory: Trajectory,
    pub exact: Option<ReferenceCurve>,
    pub errors: Option<ErrorSeries>,
    pub statistics: Option<ErrorStatistics>,
}

impl SingleMethodReport {
    pub fn new(
        grid: &StepGrid,
        trajectory: Trajectory,
        exact: Option<&dyn ExactSolution>,
    ) -> Result<SingleMethodReport, EulerError> {
        check_on_grid(grid, &trajectory)?;
        let (exact, errors, statistics) = match exact {
            Some(g) => {
                let reference = select_reference(grid, &BTreeMap::new(), Some(g))?;
                let errors = error_series(&trajectory, &reference)?;
                let statistics = errors.statistics();
                (Some(reference), Some(errors), Some(statistics))
            }
            None => (None, None, None),
        };
        Ok(SingleMethodReport {
            trajectory,
            exact,
            errors,
            statistics,
        })
    }

    pub fn table(&self) -> String {
        let mut builder = Builder::default();
        let mut header = vec!["x".to_string(), "y (Numerical)".to_string()];
        if self.exact.is_some() {
            header.push("y (Exact)".to_string());
            header.push("Absolute Error".to_string());
        }
        builder.push_record(header);
        for (i, (x, y)) in self.trajectory.points().enumerate() {
            let mut row = vec![format!("{:.4}", x), format!("{:.6}", y)];
            if let (Some(exact), Some(errors)) = (&self.exact, &self.errors) {
                row.push(format!("{:.6}", exact.y()[i]));
                row.push(format!("{:.6e}", errors.error()[i]));
            }
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::Euler_family::{AimeScheme, solve_method};
    use crate::numerical::ode_functions::{ClosureExact, ClosureODE};
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    fn quadratic_problem() -> (
        ClosureODE<impl Fn(f64, f64) -> f64 + Sync>,
        ClosureExact<impl Fn(f64) -> f64 + Sync>,
    ) {
        (
            ClosureODE::new(|x: f64, y: f64| y - x * x + 1.0, "y - x^2 + 1"),
            ClosureExact::new(|x: f64| (x + 1.0).powi(2) - 0.5 * x.exp(), "(x+1)^2 - 0.5exp(x)"),
        )
    }

    fn run_all(f: &dyn crate::numerical::ode_functions::ODEFunction, grid: &StepGrid) -> MethodResults {
        EulerMethod::iter()
            .map(|m| (m, solve_method(f, grid, m, AimeScheme::Midpoint)))
            .collect()
    }

    #[test]
    fn test_exact_reference_is_direct_call() {
        let (f, g) = quadratic_problem();
        let grid = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
        let trajectories = run_all(&f, &grid);
        let reference = select_reference(&grid, &trajectories, Some(&g)).unwrap();
        assert_eq!(reference.source(), ReferenceSource::Exact);
        assert_eq!(reference.len(), 11);
        for (x, y) in reference.x().iter().zip(reference.y().iter()) {
            assert_eq!(*y, g.eval(*x));
        }
        let aime = trajectories[&EulerMethod::AIME].as_ref().unwrap();
        assert_eq!(reference.x(), aime.x());
    }

    #[test]
    fn test_aime_reference_without_exact() {
        let (f, _g) = quadratic_problem();
        let grid = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
        let trajectories = run_all(&f, &grid);
        let reference = select_reference(&grid, &trajectories, None).unwrap();
        assert_eq!(reference.source(), ReferenceSource::AIME);
        let aime = trajectories[&EulerMethod::AIME].as_ref().unwrap();
        assert_eq!(reference.y(), aime.y());

        let errors = compare(&trajectories, &reference).unwrap();
        assert!(errors[&EulerMethod::AIME].error().iter().all(|e| *e == 0.0));
        // Modified Euler is the same scheme as AIME
        assert!(errors[&EulerMethod::ModifiedEuler].error().iter().all(|e| *e == 0.0));
        assert!(errors[&EulerMethod::Euler].error()[10] > 0.0);
    }

    #[test]
    fn test_error_series_properties() {
        let (f, _g) = quadratic_problem();
        // exact solution deliberately inconsistent with y0
        let shifted = ClosureExact::new(|x: f64| (x + 1.0).powi(2) - 0.5 * x.exp() + 0.1, "shifted");
        let grid = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
        let trajectories = run_all(&f, &grid);
        let reference = select_reference(&grid, &trajectories, Some(&shifted)).unwrap();
        let errors = compare(&trajectories, &reference).unwrap();
        assert_eq!(errors.len(), 5);
        for (method, series) in errors.iter() {
            assert_eq!(series.method(), *method);
            assert_eq!(series.len(), 11);
            assert!(series.error().iter().all(|e| *e >= 0.0));
            assert_relative_eq!(series.error()[0], (0.5 - reference.y()[0]).abs(), epsilon = 1e-15);
            assert_relative_eq!(series.error()[0], 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_comparison() {
        let (f, g) = quadratic_problem();
        let grid = StepGrid::new(0.0, 0.5, 0.0, 0.2).unwrap();
        let trajectories = run_all(&f, &grid);
        let report = ComparisonReport::new(grid, trajectories.clone(), Some(&g)).unwrap();
        let reference = report.reference.as_ref().unwrap();
        assert_eq!(reference.len(), 1);
        assert_eq!(reference.y()[0], g.eval(0.0));
        for series in report.errors.values() {
            assert_eq!(series.error()[0], (0.5 - g.eval(0.0)).abs());
        }

        let report = ComparisonReport::new(grid, trajectories, None).unwrap();
        assert_eq!(report.reference.as_ref().unwrap().y()[0], 0.5);
        assert!(report.errors.values().all(|s| s.error()[0] == 0.0));
    }

    #[test]
    fn test_failed_method_does_not_abort_siblings() {
        // NaN only reaches the look-ahead slope of Improved Euler at x0 + h = 1
        let f = ClosureODE::new(
            |x: f64, y: f64| if (x - 1.0).abs() < 1e-12 { f64::NAN } else { -y },
            "-y with a hole at x = 1",
        );
        let grid = StepGrid::with_steps(0.0, 1.0, 1.0, 1).unwrap();
        let trajectories = run_all(&f, &grid);
        assert!(trajectories[&EulerMethod::ImprovedEuler].is_err());
        assert!(trajectories[&EulerMethod::Euler].is_ok());
        assert!(trajectories[&EulerMethod::AIME].is_ok());

        let report = ComparisonReport::new(grid, trajectories, None).unwrap();
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].0, EulerMethod::ImprovedEuler);
        assert!(!report.errors.contains_key(&EulerMethod::ImprovedEuler));
        assert_eq!(report.errors.len(), 4);
        assert!(report.comparison_table().contains("failed"));
        assert!(report.final_results().contains("failed"));
    }

    #[test]
    fn test_reference_unavailable_when_aime_fails() {
        let f = ClosureODE::new(|x: f64, _y: f64| 1.0 / x, "1/x");
        let grid = StepGrid::new(0.0, 0.0, 1.0, 0.5).unwrap();
        let trajectories = run_all(&f, &grid);
        let report = ComparisonReport::new(grid, trajectories.clone(), None).unwrap();
        assert!(matches!(report.reference, Err(EulerError::ReferenceUnavailable(_))));
        assert!(report.errors.is_empty());

        let without_aime: MethodResults = trajectories
            .into_iter()
            .filter(|(m, _)| *m != EulerMethod::AIME)
            .collect();
        assert!(matches!(
            select_reference(&grid, &without_aime, None),
            Err(EulerError::ReferenceUnavailable(_))
        ));
    }

    #[test]
    fn test_non_finite_exact_solution() {
        let f = ClosureODE::new(|_x: f64, y: f64| y, "y");
        let g = ClosureExact::new(|x: f64| (1.0 - x).ln(), "ln(1-x)");
        let grid = StepGrid::new(0.0, 0.0, 2.0, 0.5).unwrap();
        let err = select_reference(&grid, &run_all(&f, &grid), Some(&g)).unwrap_err();
        assert_eq!(err, EulerError::NonFiniteReference { x: 1.0 });
    }

    #[test]
    fn test_length_mismatch() {
        let (f, g) = quadratic_problem();
        let short = StepGrid::new(0.0, 0.5, 1.0, 0.2).unwrap();
        let long = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
        let trajectory = solve_method(&f, &short, EulerMethod::Euler, AimeScheme::Midpoint).unwrap();
        let reference = select_reference(&long, &BTreeMap::new(), Some(&g)).unwrap();
        let err = error_series(&trajectory, &reference).unwrap_err();
        assert_eq!(
            err,
            EulerError::LengthMismatch {
                method: EulerMethod::Euler,
                expected: 11,
                found: 6
            }
        );
    }

    #[test]
    fn test_report_rejects_trajectories_off_grid() {
        let (f, _g) = quadratic_problem();
        let short = StepGrid::new(0.0, 0.5, 1.0, 0.2).unwrap();
        let long = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
        // AIME on the short grid would pass as its own reference
        let trajectories = run_all(&f, &short);
        let err = ComparisonReport::new(long, trajectories, None).unwrap_err();
        assert_eq!(
            err,
            EulerError::LengthMismatch {
                method: EulerMethod::Euler,
                expected: 11,
                found: 6
            }
        );

        // same number of points, different step
        let stretched = StepGrid::with_steps(0.0, 0.5, 0.1, 10).unwrap();
        let trajectories = run_all(&f, &stretched);
        let err = ComparisonReport::new(long, trajectories.clone(), None).unwrap_err();
        assert!(matches!(
            err,
            EulerError::NodeMismatch {
                method: EulerMethod::Euler,
                index: 1,
                ..
            }
        ));

        let euler = trajectories[&EulerMethod::Euler].clone().unwrap();
        assert!(matches!(
            SingleMethodReport::new(&long, euler, None),
            Err(EulerError::NodeMismatch { .. })
        ));

        let report = ComparisonReport::new(short, run_all(&f, &short), None).unwrap();
        assert_eq!(report.comparison_table().lines().count(), report.error_table().lines().count());
    }

    #[test]
    fn test_single_method_report() {
        let (f, g) = quadratic_problem();
        let grid = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
        let trajectory = solve_method(&f, &grid, EulerMethod::Euler, AimeScheme::Midpoint).unwrap();
        let report = SingleMethodReport::new(&grid, trajectory.clone(), Some(&g)).unwrap();
        let stats = report.statistics.unwrap();
        let errors = report.errors.as_ref().unwrap();
        assert_eq!(stats.final_error, errors.error()[10]);
        assert_relative_eq!(stats.final_error, 0.4396874462, epsilon = 1e-8);
        assert!(stats.max >= stats.mean);
        assert_eq!(stats.max, stats.final_error);
        assert!(report.table().contains("Absolute Error"));

        let report = SingleMethodReport::new(&grid, trajectory, None).unwrap();
        assert!(report.statistics.is_none());
        assert!(!report.table().contains("Absolute Error"));
    }

    #[test]
    fn test_tables_layout() {
        let (f, g) = quadratic_problem();
        let grid = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
        let report = ComparisonReport::new(grid, run_all(&f, &grid), Some(&g)).unwrap();
        let table = report.comparison_table();
        for method in EulerMethod::iter() {
            assert!(table.contains(&method.to_string()));
        }
        assert!(table.contains("Exact Solution"));
        assert!(table.contains("0.800000"));
        assert!(report.error_table().contains("Improved Modified Euler Error"));
        let listing = report.final_results();
        assert!(listing.contains("2.000"));
        assert!(listing.contains("4.865785"));
    }
}
