// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! User-facing solver for the Euler family.
//!
//! # Example
//! ```rust, ignore
//! use RustedEuler::numerical::Euler_api::EulerFamilySolver;
//! use RustedEuler::numerical::ode_functions::{ClosureExact, ClosureODE};
//! let f = ClosureODE::new(|x, y| y - x * x + 1.0, "y - x^2 + 1");
//! let mut solver = EulerFamilySolver::new(Box::new(f), 0.0, 0.5, 2.0, 0.2);
//! solver.set_exact_solution(Box::new(ClosureExact::new(
//!     |x: f64| (x + 1.0).powi(2) - 0.5 * x.exp(),
//!     "(x+1)^2 - 0.5*exp(x)",
//! )));
//! let report = solver.solve().unwrap();
//! println!("{}", report.comparison_table());
//! ```
use crate::Utils::logger::{save_report_to_csv, save_single_to_csv};
use crate::Utils::plots::{plot_errors, plot_single, plot_solutions};
use crate::numerical::Euler_comparison::{ComparisonReport, MethodResults, SingleMethodReport};
use crate::numerical::Euler_family::{AimeScheme, EulerError, EulerMethod, StepGrid, solve_method};
use crate::numerical::Examples_and_utils::IVPExample;
use crate::numerical::ode_functions::{ExactSolution, ODEFunction};
use chrono::Local;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use simplelog::*;
use std::error::Error;
use std::fs::File;
use std::time::Instant;
use strum::IntoEnumIterator;

/// Run every requested method on the same grid. A failed method is stored as an error and
/// the others are still computed.
pub fn run_methods(
    f: &dyn ODEFunction,
    grid: &StepGrid,
    methods: &[EulerMethod],
    aime_scheme: AimeScheme,
    parallel: bool,
) -> MethodResults {
    let solve_one = |method: &EulerMethod| (*method, solve_method(f, grid, *method, aime_scheme));
    if parallel {
        methods.par_iter().map(solve_one).collect()
    } else {
        methods.iter().map(solve_one).collect()
    }
}

pub struct EulerFamilySolver {
    f: Box<dyn ODEFunction>,
    exact: Option<Box<dyn ExactSolution>>,
    x0: f64,
    y0: f64,
    xn: f64,
    h: f64,
    methods: Vec<EulerMethod>,
    aime_scheme: AimeScheme,
    parallel: bool,
    pub log_level: Option<LevelFilter>,
    log_to_file: Option<String>,
    log_to_console: bool,
    report: Option<ComparisonReport>,
}

impl EulerFamilySolver {
    pub fn new(f: Box<dyn ODEFunction>, x0: f64, y0: f64, xn: f64, h: f64) -> EulerFamilySolver {
        EulerFamilySolver {
            f,
            exact: None,
            x0,
            y0,
            xn,
            h,
            methods: EulerMethod::iter().collect(),
            aime_scheme: AimeScheme::default(),
            parallel: false,
            log_level: Some(LevelFilter::Info),
            log_to_file: None,
            log_to_console: true,
            report: None,
        }
    }

    /// problem from the built-in catalog with its exact solution and default grid
    pub fn from_example(example: IVPExample) -> EulerFamilySolver {
        let (x0, y0, xn, h) = example.setup();
        let mut solver = EulerFamilySolver::new(example.rhs(), x0, y0, xn, h);
        solver.set_exact_solution(example.exact());
        solver
    }

    pub fn set_exact_solution(&mut self, exact: Box<dyn ExactSolution>) {
        self.exact = Some(exact);
        self.report = None;
    }

    pub fn set_grid(&mut self, x0: f64, y0: f64, xn: f64, h: f64) {
        self.x0 = x0;
        self.y0 = y0;
        self.xn = xn;
        self.h = h;
        self.report = None;
    }

    /// methods to run; repeated entries are ignored
    pub fn set_methods(&mut self, methods: Vec<EulerMethod>) {
        let mut unique: Vec<EulerMethod> = Vec::with_capacity(methods.len());
        for method in methods {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        self.methods = unique;
        self.report = None;
    }

    pub fn set_aime_scheme(&mut self, aime_scheme: AimeScheme) {
        self.aime_scheme = aime_scheme;
        self.report = None;
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn methods(&self) -> &[EulerMethod] {
        &self.methods
    }

    pub fn grid(&self) -> Result<StepGrid, EulerError> {
        StepGrid::new(self.x0, self.y0, self.xn, self.h)
    }

    /// Solve with every selected method, pick the reference curve and compute the error series
    pub fn solve(&mut self) -> Result<&ComparisonReport, EulerError> {
        self.init_logger();
        if self.methods.is_empty() {
            error!("no methods selected");
            return Err(EulerError::InvalidInput("no methods selected".to_string()));
        }
        let grid = self.grid().inspect_err(|e| error!("{}", e))?;
        info!(
            "solving y' = {} on [{}, {}] with h = {}, n = {} steps, methods: {:?}",
            self.f.name(),
            grid.x0,
            grid.x_end(),
            grid.h,
            grid.n,
            self.methods
        );
        let begin = Instant::now();
        let trajectories = run_methods(
            self.f.as_ref(),
            &grid,
            &self.methods,
            self.aime_scheme,
            self.parallel,
        );
        for (method, trajectory) in trajectories.iter() {
            match trajectory {
                Ok(t) => {
                    let (x, y) = t.last();
                    debug!(
                        "{}: y({:.3}) = {:.6} after {} evaluations of f",
                        method,
                        x,
                        y,
                        t.evaluations()
                    );
                }
                Err(e) => warn!("{} failed: {}", method, e),
            }
        }
        let report = ComparisonReport::new(grid, trajectories, self.exact.as_deref())?;
        match &report.reference {
            Ok(reference) => info!("reference curve: {}", reference.source()),
            Err(e) => warn!("errors not computed: {}", e),
        }
        for (method, series) in report.errors.iter() {
            let stats = series.statistics();
            debug!(
                "{} error: max {:.6e}, final {:.6e}, mean {:.6e}",
                method, stats.max, stats.final_error, stats.mean
            );
        }
        info!("solved in {} ms", begin.elapsed().as_millis());
        Ok(&*self.report.insert(report))
    }

    /// One method with table, exact values and error statistics when an exact solution is set
    pub fn solve_single(&self, method: EulerMethod) -> Result<SingleMethodReport, EulerError> {
        self.init_logger();
        let grid = self.grid()?;
        info!("solving y' = {} with {} and n = {} steps", self.f.name(), method, grid.n);
        let trajectory = solve_method(self.f.as_ref(), &grid, method, self.aime_scheme)
            .inspect_err(|e| error!("{}", e))?;
        let report = SingleMethodReport::new(&grid, trajectory, self.exact.as_deref())?;
        if let Some(stats) = &report.statistics {
            info!(
                "max error {:.6e}, final error {:.6e}, mean error {:.6e}",
                stats.max, stats.final_error, stats.mean
            );
        }
        Ok(report)
    }

    pub fn get_result(&self) -> Option<&ComparisonReport> {
        self.report.as_ref()
    }

    fn solved_report(&self) -> Result<&ComparisonReport, Box<dyn Error>> {
        self.report
            .as_ref()
            .ok_or_else(|| "no results yet: call solve() first".into())
    }

    pub fn print_result(&self) {
        match &self.report {
            Some(report) => {
                println!("{}", report.comparison_table());
                if !report.errors.is_empty() {
                    println!("{}", report.error_table());
                }
                println!("{}", report.final_results());
            }
            None => println!("no results yet: call solve() first"),
        }
    }

    /// writes `{prefix}_solutions.png` and `{prefix}_errors.png`
    pub fn plot_result(&self, prefix: &str, log_scale: bool) -> Result<(), Box<dyn Error>> {
        let report = self.solved_report()?;
        plot_solutions(report, &format!("{}_solutions.png", prefix))?;
        if !report.errors.is_empty() {
            plot_errors(report, &format!("{}_errors.png", prefix), log_scale)?;
        }
        info!("results plotted to {}_*.png", prefix);
        Ok(())
    }

    pub fn plot_single(&self, report: &SingleMethodReport, filename: &str) -> Result<(), Box<dyn Error>> {
        plot_single(report, filename)?;
        info!("{} plotted to {}", report.trajectory.method(), filename);
        Ok(())
    }

    pub fn save_result(&self, filename: &str) -> Result<(), Box<dyn Error>> {
        let report = self.solved_report()?;
        save_report_to_csv(report, filename)?;
        info!("results saved to {}", filename);
        Ok(())
    }

    pub fn save_single(&self, report: &SingleMethodReport, filename: &str) -> Result<(), Box<dyn Error>> {
        save_single_to_csv(report, filename)?;
        info!("{} saved to {}", report.trajectory.method(), filename);
        Ok(())
    }

    ////////////////////////////////logging functions
    /// Set logging level (Off, Error, Warn, Info, Debug, Trace)
    pub fn set_log_level(&mut self, level: LevelFilter) {
        self.log_level = Some(level);
    }

    /// Enable logging to file
    pub fn set_log_file(&mut self, filename: String) {
        self.log_to_file = Some(filename);
    }

    pub fn set_console_logging(&mut self, enabled: bool) {
        self.log_to_console = enabled;
    }

    pub fn disable_logging(&mut self) {
        self.set_log_level(LevelFilter::Off);
    }

    /// Debug level; without a file name the log goes to log_<date>_<time>.txt
    pub fn enable_verbose_logging(&mut self, log_file: Option<String>) {
        self.set_log_level(LevelFilter::Debug);
        let filename = log_file.unwrap_or_else(|| {
            let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
            format!("log_{}.txt", date_and_time)
        });
        self.set_log_file(filename);
    }

    /// The global logger can be set once per process; later calls are no-ops and leave
    /// the log file of the installed logger untouched
    fn init_logger(&self) {
        let level = self.log_level.unwrap_or(LevelFilter::Info);
        if level == LevelFilter::Off || log::max_level() != LevelFilter::Off {
            return;
        }
        let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
        if self.log_to_console {
            loggers.push(TermLogger::new(
                level,
                Config::default(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            ));
        }
        if let Some(ref filename) = self.log_to_file {
            if let Ok(file) = File::create(filename) {
                loggers.push(WriteLogger::new(level, Config::default(), file));
            }
        }
        if !loggers.is_empty() {
            let _ = CombinedLogger::init(loggers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::Euler_comparison::ReferenceSource;
    use crate::numerical::ode_functions::ClosureODE;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn quiet(mut solver: EulerFamilySolver) -> EulerFamilySolver {
        solver.disable_logging();
        solver
    }

    #[test]
    fn test_solve_quadratic_forcing() {
        let mut solver = quiet(EulerFamilySolver::from_example(IVPExample::QuadraticForcing));
        let report = solver.solve().unwrap();
        assert_eq!(report.grid.n, 10);
        assert_eq!(report.trajectories.len(), 5);
        assert!(report.failures().is_empty());
        let reference = report.reference.as_ref().unwrap();
        assert_eq!(reference.source(), ReferenceSource::Exact);
        let euler = report.trajectory(EulerMethod::Euler).unwrap();
        assert_relative_eq!(euler.y()[1], 0.8, epsilon = 1e-12);
        let final_error = report.errors[&EulerMethod::Euler].statistics().final_error;
        assert_relative_eq!(final_error, 0.4396874462, epsilon = 1e-8);
        assert!(solver.get_result().is_some());
    }

    #[test]
    fn test_aime_reference_without_exact_solution() {
        let f = ClosureODE::new(|x, y| y - x * x + 1.0, "y - x^2 + 1");
        let mut solver = quiet(EulerFamilySolver::new(Box::new(f), 0.0, 0.5, 2.0, 0.2));
        let report = solver.solve().unwrap();
        let reference = report.reference.as_ref().unwrap();
        assert_eq!(reference.source(), ReferenceSource::AIME);
        let aime_error = &report.errors[&EulerMethod::AIME];
        assert!(aime_error.error().iter().all(|e| *e == 0.0));
        // AIME is the midpoint rule by default
        assert!(report.errors[&EulerMethod::ModifiedEuler].error().iter().all(|e| *e == 0.0));
    }

    #[test]
    fn test_reference_unavailable_for_subset_without_aime() {
        let f = ClosureODE::new(|x, y| y - x * x + 1.0, "y - x^2 + 1");
        let mut solver = quiet(EulerFamilySolver::new(Box::new(f), 0.0, 0.5, 2.0, 0.2));
        solver.set_methods(vec![EulerMethod::Euler, EulerMethod::ImprovedEuler, EulerMethod::Euler]);
        assert_eq!(solver.methods().len(), 2);
        let report = solver.solve().unwrap();
        assert_eq!(report.trajectories.len(), 2);
        assert!(report.reference.is_err());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential = quiet(EulerFamilySolver::from_example(IVPExample::Logistic));
        let mut parallel = quiet(EulerFamilySolver::from_example(IVPExample::Logistic));
        parallel.set_parallel(true);
        let a = sequential.solve().unwrap().clone();
        let b = parallel.solve().unwrap();
        for method in EulerMethod::iter() {
            assert_eq!(a.trajectory(method).unwrap(), b.trajectory(method).unwrap());
        }
    }

    #[test]
    fn test_invalid_input() {
        let mut solver = quiet(EulerFamilySolver::from_example(IVPExample::LinearGrowth));
        solver.set_grid(0.0, 1.0, 1.0, 0.0);
        assert!(matches!(solver.solve(), Err(EulerError::InvalidStepSize(_))));
        solver.set_grid(0.0, 1.0, 1.0, 0.1);
        solver.set_methods(vec![]);
        assert!(matches!(solver.solve(), Err(EulerError::InvalidInput(_))));
    }

    #[test]
    fn test_failed_method_does_not_abort_others() {
        let f = ClosureODE::new(|x: f64, _y: f64| (1.0 - x).sqrt(), "sqrt(1 - x)");
        let mut solver = quiet(EulerFamilySolver::new(Box::new(f), 0.0, 0.0, 2.0, 0.25));
        let report = solver.solve().unwrap();
        let failures = report.failures();
        assert!(!failures.is_empty());
        assert!(
            failures
                .iter()
                .all(|(_, e)| matches!(e, EulerError::NonFiniteEvaluation { .. }))
        );
        assert!(report.reference.is_err());
    }

    #[test]
    fn test_solve_single() {
        let solver = quiet(EulerFamilySolver::from_example(IVPExample::QuadraticForcing));
        let report = solver.solve_single(EulerMethod::ImprovedEuler).unwrap();
        assert_eq!(report.trajectory.len(), 11);
        assert_relative_eq!(report.trajectory.y()[1], 0.826, epsilon = 1e-12);
        let stats = report.statistics.unwrap();
        assert!(stats.max >= stats.mean);
        assert!(stats.final_error < 0.1);
        assert!(report.table().contains("Absolute Error"));
    }

    #[test]
    fn test_installed_logger_keeps_log_file() {
        let mut console = EulerFamilySolver::from_example(IVPExample::Logistic);
        console.set_log_level(LevelFilter::Info);
        console.init_logger();
        assert_ne!(log::max_level(), LevelFilter::Off);

        let dir = tempdir().unwrap();
        let path = dir.path().join("euler.log");
        std::fs::write(&path, "earlier run\n").unwrap();
        let mut solver = EulerFamilySolver::from_example(IVPExample::Logistic);
        solver.set_log_file(path.to_str().unwrap().to_string());
        solver.init_logger();
        solver.solve().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier run"));
    }

    #[test]
    fn test_save_result() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("euler.csv");
        let filename = path.to_str().unwrap();
        let mut solver = quiet(EulerFamilySolver::from_example(IVPExample::ExponentialDecay));
        assert!(solver.save_result(filename).is_err());
        solver.solve().unwrap();
        solver.save_result(filename).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 22);
        assert!(content.lines().next().unwrap().starts_with("x,Euler"));
    }

    #[test]
    fn test_run_methods_keeps_order_of_keys() {
        let f = ClosureODE::new(|_x, y| -y, "-y");
        let grid = StepGrid::new(0.0, 1.0, 1.0, 0.1).unwrap();
        let results = run_methods(
            &f,
            &grid,
            &[EulerMethod::AIME, EulerMethod::Euler],
            AimeScheme::Midpoint,
            true,
        );
        let keys: Vec<EulerMethod> = results.keys().copied().collect();
        assert_eq!(keys, vec![EulerMethod::Euler, EulerMethod::AIME]);
        assert_relative_eq!(
            results[&EulerMethod::Euler].as_ref().unwrap().last().1,
            0.9_f64.powi(10),
            epsilon = 1e-12
        );
    }
}
