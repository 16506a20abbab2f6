// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! # Euler family of fixed-step explicit IVP solvers
//!
//! Five one-step schemes for a scalar ODE dy/dx = f(x, y), y(x0) = y0:
//!
//! | Method                  | Update rule                                                             | f evals/step |
//! |-------------------------|-------------------------------------------------------------------------|--------------|
//! | Euler                   | y + h f(x, y)                                                           | 1            |
//! | Improved Euler (Heun)   | y + h/2 (k1 + k2), k2 = f(x + h, y + h k1)                              | 2            |
//! | Modified Euler          | y + h f(x + h/2, y + h/2 f(x, y))                                       | 2            |
//! | Improved Modified Euler | y + h f(x + h/2, y + h/2 f(x, y + h f(x, y)))                           | 3            |
//! | AIME                    | same as Modified Euler (or nested midpoint, see [`AimeScheme`])         | 2 (3)        |
//!
//! All methods share one stepping driver ([`integrate`]); they differ only by the step rule,
//! a plain function of type [`StepRule`]. The driver walks the grid x_i = x0 + i h, i = 0..n,
//! without any error control: no adaptation, no retries.
//!
//! ```rust, ignore
//! use RustedEuler::numerical::Euler_family::{EulerMethod, StepGrid, solve_method, AimeScheme};
//! use RustedEuler::numerical::ode_functions::ClosureODE;
//! let f = ClosureODE::new(|x, y| y - x * x + 1.0, "y - x^2 + 1");
//! let grid = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
//! let trajectory = solve_method(&f, &grid, EulerMethod::Euler, AimeScheme::Midpoint).unwrap();
//! assert_eq!(trajectory.len(), 11);
//! ```
use crate::numerical::ode_functions::ODEFunction;
use nalgebra::DVector;
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// guards floor((xn - x0)/h) against representation error, e.g. 0.3/0.1 = 2.9999999999999996
pub const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// largest number of steps a grid may have; every trajectory stores n + 1 points
pub const MAX_STEPS: usize = 100_000_000;

/// Enum to represent the members of the Euler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum EulerMethod {
    #[strum(to_string = "Euler", serialize = "euler")]
    Euler,
    #[strum(to_string = "Improved Euler", serialize = "improved_euler", serialize = "heun")]
    ImprovedEuler,
    #[strum(to_string = "Modified Euler", serialize = "modified_euler", serialize = "midpoint")]
    ModifiedEuler,
    #[strum(to_string = "Improved Modified Euler", serialize = "improved_modified_euler")]
    ImprovedModifiedEuler,
    #[strum(to_string = "AIME", serialize = "aime")]
    AIME,
}

/// Which update rule the AIME method uses.
/// `Midpoint` is the same formula as Modified Euler, `NestedMidpoint` refines the half-step
/// predictor once more before the final midpoint slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AimeScheme {
    #[default]
    Midpoint,
    #[strum(to_string = "nested_midpoint", serialize = "nested")]
    NestedMidpoint,
}

impl EulerMethod {
    /// formal order of global accuracy for smooth f
    pub fn order(&self) -> usize {
        match self {
            EulerMethod::Euler => 1,
            _ => 2,
        }
    }

    pub fn evaluations_per_step(&self, aime: AimeScheme) -> usize {
        match self {
            EulerMethod::Euler => 1,
            EulerMethod::ImprovedEuler | EulerMethod::ModifiedEuler => 2,
            EulerMethod::ImprovedModifiedEuler => 3,
            EulerMethod::AIME => match aime {
                AimeScheme::Midpoint => 2,
                AimeScheme::NestedMidpoint => 3,
            },
        }
    }

    pub fn step_rule(&self, aime: AimeScheme) -> StepRule {
        match self {
            EulerMethod::Euler => euler_step,
            EulerMethod::ImprovedEuler => improved_euler_step,
            EulerMethod::ModifiedEuler => modified_euler_step,
            EulerMethod::ImprovedModifiedEuler => improved_modified_euler_step,
            EulerMethod::AIME => match aime {
                AimeScheme::Midpoint => aime_step,
                AimeScheme::NestedMidpoint => aime_nested_step,
            },
        }
    }
}

/// Error types of the Euler family solvers
#[derive(Debug, Clone, PartialEq)]
pub enum EulerError {
    /// h = 0 or h is not a finite number
    InvalidStepSize(f64),
    InvalidInput(String),
    /// f(x, y) returned NaN/Inf (or the new state overflowed) at step `step`
    NonFiniteEvaluation {
        method: EulerMethod,
        step: usize,
        x: f64,
        y: f64,
    },
    /// exact solution returned NaN/Inf at node x
    NonFiniteReference { x: f64 },
    /// no exact solution given and the AIME trajectory is not available
    ReferenceUnavailable(String),
    LengthMismatch {
        method: EulerMethod,
        expected: usize,
        found: usize,
    },
    /// trajectory node `index` is not the grid node x0 + index h
    NodeMismatch {
        method: EulerMethod,
        index: usize,
        expected: f64,
        found: f64,
    },
}

impl fmt::Display for EulerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EulerError::InvalidStepSize(h) => {
                write!(f, "Invalid step size h = {}: must be finite and nonzero", h)
            }
            EulerError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            EulerError::NonFiniteEvaluation { method, step, x, y } => write!(
                f,
                "{}: non-finite value at step {} (x = {}, y = {})",
                method, step, x, y
            ),
            EulerError::NonFiniteReference { x } => {
                write!(f, "Exact solution is not finite at x = {}", x)
            }
            EulerError::ReferenceUnavailable(msg) => {
                write!(f, "Reference curve unavailable: {}", msg)
            }
            EulerError::LengthMismatch {
                method,
                expected,
                found,
            } => write!(
                f,
                "{}: trajectory has {} points, reference has {}",
                method, found, expected
            ),
            EulerError::NodeMismatch {
                method,
                index,
                expected,
                found,
            } => write!(
                f,
                "{}: node {} is x = {}, the grid has x = {}",
                method, index, found, expected
            ),
        }
    }
}

impl std::error::Error for EulerError {}

/// Number of fixed steps floor((xn - x0)/h); zero when xn lies on the wrong side of x0.
/// The quotient is nudged up by [`STEP_COUNT_TOLERANCE`] before flooring, so (0.3 - 0.0)/0.1
/// gives 3 steps where plain truncation of 2.9999999999999996 would give 2.
/// More than [`MAX_STEPS`] steps is `InvalidInput`.
pub fn step_count(x0: f64, xn: f64, h: f64) -> Result<usize, EulerError> {
    if h == 0.0 || !h.is_finite() {
        return Err(EulerError::InvalidStepSize(h));
    }
    if !x0.is_finite() || !xn.is_finite() {
        return Err(EulerError::InvalidInput(format!(
            "interval bounds must be finite, got x0 = {}, xn = {}",
            x0, xn
        )));
    }
    let ratio = (xn - x0) / h;
    if !ratio.is_finite() {
        return Err(EulerError::InvalidInput(format!(
            "(xn - x0)/h = {} is not finite",
            ratio
        )));
    }
    if ratio <= 0.0 {
        return Ok(0);
    }
    let n = (ratio + STEP_COUNT_TOLERANCE * ratio.max(1.0)).floor();
    if n > MAX_STEPS as f64 {
        return Err(EulerError::InvalidInput(format!(
            "(xn - x0)/h = {} steps exceeds the limit of {}",
            n, MAX_STEPS
        )));
    }
    Ok(n as usize)
}

/// Fixed grid of the problem: initial point, step and number of steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepGrid {
    pub x0: f64,
    pub y0: f64,
    pub h: f64,
    pub n: usize,
}

impl StepGrid {
    /// grid from interval end xn: n = floor((xn - x0)/h)
    pub fn new(x0: f64, y0: f64, xn: f64, h: f64) -> Result<StepGrid, EulerError> {
        let n = step_count(x0, xn, h)?;
        StepGrid::with_steps(x0, y0, h, n)
    }

    pub fn with_steps(x0: f64, y0: f64, h: f64, n: usize) -> Result<StepGrid, EulerError> {
        if h == 0.0 || !h.is_finite() {
            return Err(EulerError::InvalidStepSize(h));
        }
        if !x0.is_finite() || !y0.is_finite() {
            return Err(EulerError::InvalidInput(format!(
                "initial point must be finite, got ({}, {})",
                x0, y0
            )));
        }
        if n > MAX_STEPS {
            return Err(EulerError::InvalidInput(format!(
                "{} steps exceeds the limit of {}",
                n, MAX_STEPS
            )));
        }
        Ok(StepGrid { x0, y0, h, n })
    }

    /// x_i = x0 + i h, computed directly so the nodes never accumulate rounding drift
    pub fn node(&self, i: usize) -> f64 {
        self.x0 + i as f64 * self.h
    }

    pub fn nodes(&self) -> DVector<f64> {
        DVector::from_fn(self.n + 1, |i, _| self.node(i))
    }

    pub fn x_end(&self) -> f64 {
        self.node(self.n)
    }
}

/// Result of one method on one grid: (x_i, y_i), i = 0..n
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    method: EulerMethod,
    x: DVector<f64>,
    y: DVector<f64>,
    evaluations: usize,
}

impl Trajectory {
    pub fn method(&self) -> EulerMethod {
        self.method
    }

    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    /// total number of f(x, y) calls made while building the trajectory
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn last(&self) -> (f64, f64) {
        let i = self.len() - 1;
        (self.x[i], self.y[i])
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Checked access to f for one step rule: counts evaluations and rejects NaN/Inf
pub struct Slope<'a> {
    f: &'a dyn ODEFunction,
    method: EulerMethod,
    step: usize,
    evaluations: usize,
}

impl<'a> Slope<'a> {
    pub fn new(f: &'a dyn ODEFunction, method: EulerMethod) -> Self {
        Slope {
            f,
            method,
            step: 0,
            evaluations: 0,
        }
    }

    pub fn at(&mut self, x: f64, y: f64) -> Result<f64, EulerError> {
        self.evaluations += 1;
        let value = self.f.eval(x, y);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EulerError::NonFiniteEvaluation {
                method: self.method,
                step: self.step,
                x,
                y,
            })
        }
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// One step of a method: (slope, x_i, y_i, h) -> y_{i+1}
pub type StepRule = fn(&mut Slope<'_>, f64, f64, f64) -> Result<f64, EulerError>;

pub fn euler_step(f: &mut Slope<'_>, x: f64, y: f64, h: f64) -> Result<f64, EulerError> {
    Ok(y + h * f.at(x, y)?)
}

pub fn improved_euler_step(f: &mut Slope<'_>, x: f64, y: f64, h: f64) -> Result<f64, EulerError> {
    let k1 = f.at(x, y)?;
    let k2 = f.at(x + h, y + h * k1)?;
    Ok(y + (h / 2.0) * (k1 + k2))
}

pub fn modified_euler_step(f: &mut Slope<'_>, x: f64, y: f64, h: f64) -> Result<f64, EulerError> {
    let y_mid = y + (h / 2.0) * f.at(x, y)?;
    Ok(y + h * f.at(x + h / 2.0, y_mid)?)
}

pub fn improved_modified_euler_step(
    f: &mut Slope<'_>,
    x: f64,
    y: f64,
    h: f64,
) -> Result<f64, EulerError> {
    // full Euler predictor first, its endpoint feeds the midpoint slope
    let y_inner = y + h * f.at(x, y)?;
    let y_mid = y + (h / 2.0) * f.at(x, y_inner)?;
    Ok(y + h * f.at(x + h / 2.0, y_mid)?)
}

pub fn aime_step(f: &mut Slope<'_>, x: f64, y: f64, h: f64) -> Result<f64, EulerError> {
    let y_half = y + (h / 2.0) * f.at(x, y)?;
    Ok(y + h * f.at(x + h / 2.0, y_half)?)
}

pub fn aime_nested_step(f: &mut Slope<'_>, x: f64, y: f64, h: f64) -> Result<f64, EulerError> {
    let k1 = f.at(x, y)?;
    let k2 = f.at(x, y + (h / 2.0) * k1)?;
    let k3 = f.at(x + h / 2.0, y + (h / 2.0) * k2)?;
    Ok(y + h * k3)
}

/// Generic stepping driver shared by all methods.
/// Step i + 1 depends only on step i; the first failure is terminal for this trajectory.
pub fn integrate(
    f: &dyn ODEFunction,
    grid: &StepGrid,
    method: EulerMethod,
    rule: StepRule,
) -> Result<Trajectory, EulerError> {
    let n = grid.n;
    let mut x: Vec<f64> = Vec::with_capacity(n + 1);
    let mut y: Vec<f64> = Vec::with_capacity(n + 1);
    x.push(grid.x0);
    y.push(grid.y0);

    let mut slope = Slope::new(f, method);
    let mut y_i = grid.y0;
    for i in 0..n {
        let x_i = grid.node(i);
        slope.step = i;
        let y_next = rule(&mut slope, x_i, y_i, grid.h)?;
        if !y_next.is_finite() {
            return Err(EulerError::NonFiniteEvaluation {
                method,
                step: i,
                x: x_i,
                y: y_i,
            });
        }
        x.push(grid.node(i + 1));
        y.push(y_next);
        y_i = y_next;
    }

    Ok(Trajectory {
        method,
        x: DVector::from_vec(x),
        y: DVector::from_vec(y),
        evaluations: slope.evaluations(),
    })
}

/// Solve the problem on the grid with one method of the family
pub fn solve_method(
    f: &dyn ODEFunction,
    grid: &StepGrid,
    method: EulerMethod,
    aime: AimeScheme,
) -> Result<Trajectory, EulerError> {
    integrate(f, grid, method, method.step_rule(aime))
}

pub fn euler(f: &dyn ODEFunction, grid: &StepGrid) -> Result<Trajectory, EulerError> {
    integrate(f, grid, EulerMethod::Euler, euler_step)
}

pub fn improved_euler(f: &dyn ODEFunction, grid: &StepGrid) -> Result<Trajectory, EulerError> {
    integrate(f, grid, EulerMethod::ImprovedEuler, improved_euler_step)
}

pub fn modified_euler(f: &dyn ODEFunction, grid: &StepGrid) -> Result<Trajectory, EulerError> {
    integrate(f, grid, EulerMethod::ModifiedEuler, modified_euler_step)
}

pub fn improved_modified_euler(
    f: &dyn ODEFunction,
    grid: &StepGrid,
) -> Result<Trajectory, EulerError> {
    integrate(
        f,
        grid,
        EulerMethod::ImprovedModifiedEuler,
        improved_modified_euler_step,
    )
}

pub fn aime(f: &dyn ODEFunction, grid: &StepGrid) -> Result<Trajectory, EulerError> {
    integrate(f, grid, EulerMethod::AIME, aime_step)
}
