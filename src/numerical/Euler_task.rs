// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
/// Task documents for the Euler family: which catalog problem to solve, on which grid, with
/// which methods, and what to do with the results.
use crate::Utils::task_parser::{DocumentMap, TaskError, Value, parse_document, parse_file};
use crate::numerical::Euler_api::EulerFamilySolver;
use crate::numerical::Euler_family::{AimeScheme, EulerMethod};
use crate::numerical::Examples_and_utils::IVPExample;
use log::LevelFilter;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

pub const TEMPLATE: &str = r#"// Euler family task template
problem
// one of: QuadraticForcing, ExponentialDecay, LinearGrowth, Logistic, Oscillating, Gaussian
name: QuadraticForcing
// compare against the closed form solution; with false the AIME trajectory is the reference
use_exact: true
// the whole grid section may be dropped to use the problem's own grid
grid
x0: 0.0 y0: 0.5 xn: 2.0 h: 0.2
solver
// any of: euler, improved_euler, modified_euler, improved_modified_euler, aime
methods: euler, improved_euler, modified_euler, improved_modified_euler, aime
parallel: false
// midpoint or nested_midpoint
aime_scheme: midpoint
// solve only one method with exact values and error statistics
// single_method: improved_euler
output
plot: false
plot_prefix: euler
log_scale: true
// csv: results.csv
// off, error, warn, info, debug, trace
loglevel: info
// log_file: euler.log
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct EulerTask {
    pub problem: IVPExample,
    pub use_exact: bool,
    pub x0: f64,
    pub y0: f64,
    pub xn: f64,
    pub h: f64,
    pub methods: Vec<EulerMethod>,
    pub single_method: Option<EulerMethod>,
    pub parallel: bool,
    pub aime_scheme: AimeScheme,
    pub plot: bool,
    pub plot_prefix: String,
    pub log_scale: bool,
    pub csv: Option<String>,
    pub loglevel: LevelFilter,
    pub log_file: Option<String>,
}

fn lookup<'a>(document: &'a DocumentMap, section: &str, key: &str) -> Option<&'a Value> {
    document
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|values| values.first())
}

fn invalid(section: &str, key: &str, value: &Value, expected: &str) -> TaskError {
    TaskError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn required_float(document: &DocumentMap, section: &str, key: &str) -> Result<f64, TaskError> {
    let value = lookup(document, section, key).ok_or_else(|| TaskError::MissingKey {
        section: section.to_string(),
        key: key.to_string(),
    })?;
    value
        .as_float()
        .ok_or_else(|| invalid(section, key, value, "a number"))
}

fn optional_bool(
    document: &DocumentMap,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, TaskError> {
    match lookup(document, section, key) {
        Some(value) => value
            .as_boolean()
            .ok_or_else(|| invalid(section, key, value, "true or false")),
        None => Ok(default),
    }
}

/// any value parsed by name, e.g. a method or a log level
fn named<T: FromStr>(section: &str, key: &str, value: &Value, expected: &str) -> Result<T, TaskError> {
    value
        .to_string()
        .parse::<T>()
        .map_err(|_| invalid(section, key, value, expected))
}

impl EulerTask {
    pub fn from_document(document: &DocumentMap) -> Result<EulerTask, TaskError> {
        if !document.contains_key("problem") {
            return Err(TaskError::MissingSection("problem".to_string()));
        }
        let name = lookup(document, "problem", "name").ok_or_else(|| TaskError::MissingKey {
            section: "problem".to_string(),
            key: "name".to_string(),
        })?;
        let problem: IVPExample = named("problem", "name", name, "a catalog problem name")?;
        let use_exact = optional_bool(document, "problem", "use_exact", true)?;

        let (x0, y0, xn, h) = if document.contains_key("grid") {
            (
                required_float(document, "grid", "x0")?,
                required_float(document, "grid", "y0")?,
                required_float(document, "grid", "xn")?,
                required_float(document, "grid", "h")?,
            )
        } else {
            problem.setup()
        };

        let methods = match document.get("solver").and_then(|s| s.get("methods")) {
            Some(values) => values
                .iter()
                .map(|v| named::<EulerMethod>("solver", "methods", v, "an Euler family method"))
                .collect::<Result<Vec<_>, _>>()?,
            None => EulerMethod::iter().collect(),
        };
        let single_method = lookup(document, "solver", "single_method")
            .map(|v| named::<EulerMethod>("solver", "single_method", v, "an Euler family method"))
            .transpose()?;
        let parallel = optional_bool(document, "solver", "parallel", false)?;
        let aime_scheme = lookup(document, "solver", "aime_scheme")
            .map(|v| named::<AimeScheme>("solver", "aime_scheme", v, "midpoint or nested_midpoint"))
            .transpose()?
            .unwrap_or_default();

        let plot = optional_bool(document, "output", "plot", false)?;
        let plot_prefix = lookup(document, "output", "plot_prefix")
            .map(|v| v.to_string())
            .unwrap_or_else(|| "euler".to_string());
        let log_scale = optional_bool(document, "output", "log_scale", true)?;
        let csv = lookup(document, "output", "csv").map(|v| v.to_string());
        let loglevel = lookup(document, "output", "loglevel")
            .map(|v| named::<LevelFilter>("output", "loglevel", v, "off, error, warn, info, debug or trace"))
            .transpose()?
            .unwrap_or(LevelFilter::Info);
        let log_file = lookup(document, "output", "log_file").map(|v| v.to_string());

        Ok(EulerTask {
            problem,
            use_exact,
            x0,
            y0,
            xn,
            h,
            methods,
            single_method,
            parallel,
            aime_scheme,
            plot,
            plot_prefix,
            log_scale,
            csv,
            loglevel,
            log_file,
        })
    }

    pub fn from_file(path: &str) -> Result<EulerTask, TaskError> {
        EulerTask::from_document(&parse_file(path)?)
    }

    /// solver configured with everything except the output options
    pub fn solver(&self) -> EulerFamilySolver {
        let mut solver = EulerFamilySolver::new(self.problem.rhs(), self.x0, self.y0, self.xn, self.h);
        if self.use_exact {
            solver.set_exact_solution(self.problem.exact());
        }
        solver.set_methods(self.methods.clone());
        solver.set_aime_scheme(self.aime_scheme);
        solver.set_parallel(self.parallel);
        solver.set_log_level(self.loglevel);
        if let Some(ref log_file) = self.log_file {
            solver.set_log_file(log_file.clone());
        }
        solver
    }

    /// solve, print the tables, then plot and save as requested
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        let mut solver = self.solver();
        match self.single_method {
            Some(method) => {
                let report = solver.solve_single(method)?;
                println!("{}", report.table());
                if let Some(stats) = &report.statistics {
                    println!(
                        "max error: {:.6e}\nfinal error: {:.6e}\nmean error: {:.6e}",
                        stats.max, stats.final_error, stats.mean
                    );
                }
                if self.plot {
                    solver.plot_single(&report, &format!("{}_{:?}.png", self.plot_prefix, method))?;
                }
                if let Some(ref csv) = self.csv {
                    solver.save_single(&report, csv)?;
                }
            }
            None => {
                solver.solve()?;
                solver.print_result();
                if self.plot {
                    solver.plot_result(&self.plot_prefix, self.log_scale)?;
                }
                if let Some(ref csv) = self.csv {
                    solver.save_result(csv)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for EulerTask {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<EulerTask, TaskError> {
        EulerTask::from_document(&parse_document(s)?)
    }
}

/// writes the commented task template, refusing to overwrite an existing file
pub fn create_template_file(path: &Path) -> Result<(), TaskError> {
    if path.exists() {
        return Err(TaskError::Io(format!("{} already exists", path.display())));
    }
    std::fs::write(path, TEMPLATE).map_err(|e| TaskError::Io(format!("{}: {}", path.display(), e)))
}
