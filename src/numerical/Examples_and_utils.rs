// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
/// a collection of scalar IVPs with known exact solutions for testing and demonstrating the Euler family
use crate::numerical::ode_functions::{ClosureExact, ClosureODE, ExactSolution, ODEFunction};
use strum_macros::{Display, EnumIter, EnumString};

//EXAMPLES OF SCALAR IVP WITH ELEMENTARY EXACT SOLUTIONS
/*
QuadraticForcing (classic textbook test problem):
y' = y - x^2 + 1, y(0) = 0.5, 0 <= x <= 2
exact solution:
y = (x+1)^2 - 0.5*exp(x)

ExponentialDecay:
y' = -2*y, y(0) = 1
exact solution:
y = exp(-2x)

LinearGrowth:
y' = x + y, y(0) = 1
exact solution:
y = 2*exp(x) - x - 1

Logistic:
y' = y*(1-y), y(0) = 0.5
exact solution:
y = 1/(1+exp(-x))

Oscillating:
y' = cos(x), y(0) = 0
exact solution:
y = sin(x)

Gaussian:
y' = x*y, y(0) = 1
exact solution:
y = exp(x^2/2)
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum IVPExample {
    QuadraticForcing,
    ExponentialDecay,
    LinearGrowth,
    Logistic,
    Oscillating,
    Gaussian,
}

impl IVPExample {
    /// right-hand side f(x, y)
    pub fn rhs(&self) -> Box<dyn ODEFunction> {
        let name = self.expression();
        match self {
            IVPExample::QuadraticForcing => {
                Box::new(ClosureODE::new(|x: f64, y: f64| y - x * x + 1.0, name))
            }
            IVPExample::ExponentialDecay => Box::new(ClosureODE::new(|_x: f64, y: f64| -2.0 * y, name)),
            IVPExample::LinearGrowth => Box::new(ClosureODE::new(|x: f64, y: f64| x + y, name)),
            IVPExample::Logistic => Box::new(ClosureODE::new(|_x: f64, y: f64| y * (1.0 - y), name)),
            IVPExample::Oscillating => Box::new(ClosureODE::new(|x: f64, _y: f64| x.cos(), name)),
            IVPExample::Gaussian => Box::new(ClosureODE::new(|x: f64, y: f64| x * y, name)),
        }
    }

    pub fn exact(&self) -> Box<dyn ExactSolution> {
        let name = self.exact_expression();
        match self {
            IVPExample::QuadraticForcing => Box::new(ClosureExact::new(
                |x: f64| (x + 1.0).powi(2) - 0.5 * x.exp(),
                name,
            )),
            IVPExample::ExponentialDecay => {
                Box::new(ClosureExact::new(|x: f64| (-2.0 * x).exp(), name))
            }
            IVPExample::LinearGrowth => {
                Box::new(ClosureExact::new(|x: f64| 2.0 * x.exp() - x - 1.0, name))
            }
            IVPExample::Logistic => {
                Box::new(ClosureExact::new(|x: f64| 1.0 / (1.0 + (-x).exp()), name))
            }
            IVPExample::Oscillating => Box::new(ClosureExact::new(|x: f64| x.sin(), name)),
            IVPExample::Gaussian => Box::new(ClosureExact::new(|x: f64| (x * x / 2.0).exp(), name)),
        }
    }

    /// default (x0, y0, xn, h)
    pub fn setup(&self) -> (f64, f64, f64, f64) {
        match self {
            IVPExample::QuadraticForcing => (0.0, 0.5, 2.0, 0.2),
            IVPExample::ExponentialDecay => (0.0, 1.0, 2.0, 0.1),
            IVPExample::LinearGrowth => (0.0, 1.0, 1.0, 0.1),
            IVPExample::Logistic => (0.0, 0.5, 5.0, 0.25),
            IVPExample::Oscillating => (0.0, 0.0, 6.0, 0.3),
            IVPExample::Gaussian => (0.0, 1.0, 1.5, 0.1),
        }
    }

    pub fn expression(&self) -> &'static str {
        match self {
            IVPExample::QuadraticForcing => "y - x^2 + 1",
            IVPExample::ExponentialDecay => "-2*y",
            IVPExample::LinearGrowth => "x + y",
            IVPExample::Logistic => "y*(1 - y)",
            IVPExample::Oscillating => "cos(x)",
            IVPExample::Gaussian => "x*y",
        }
    }

    pub fn exact_expression(&self) -> &'static str {
        match self {
            IVPExample::QuadraticForcing => "(x + 1)^2 - 0.5*exp(x)",
            IVPExample::ExponentialDecay => "exp(-2*x)",
            IVPExample::LinearGrowth => "2*exp(x) - x - 1",
            IVPExample::Logistic => "1/(1 + exp(-x))",
            IVPExample::Oscillating => "sin(x)",
            IVPExample::Gaussian => "exp(x^2/2)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::Euler_family::{AimeScheme, EulerMethod, StepGrid, solve_method};
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_exact_solutions_match_initial_conditions() {
        for example in IVPExample::iter() {
            let (x0, y0, _xn, _h) = example.setup();
            assert_relative_eq!(example.exact().eval(x0), y0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_exact_solutions_satisfy_ode() {
        // central difference of g against f(x, g(x))
        let d = 1e-5;
        for example in IVPExample::iter() {
            let (x0, _y0, xn, _h) = example.setup();
            let (f, g) = (example.rhs(), example.exact());
            for k in 1..10 {
                let x = x0 + (xn - x0) * k as f64 / 10.0;
                let dg = (g.eval(x + d) - g.eval(x - d)) / (2.0 * d);
                assert_relative_eq!(dg, f.eval(x, g.eval(x)), epsilon = 1e-5, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn test_all_examples_solve() {
        for example in IVPExample::iter() {
            let (x0, y0, xn, h) = example.setup();
            let grid = StepGrid::new(x0, y0, xn, h).unwrap();
            let f = example.rhs();
            let g = example.exact();
            let trajectory =
                solve_method(f.as_ref(), &grid, EulerMethod::ModifiedEuler, AimeScheme::Midpoint)
                    .unwrap();
            let (x_end, y_end) = trajectory.last();
            assert_relative_eq!(x_end, xn, epsilon = 1e-9);
            assert_relative_eq!(y_end, g.eval(x_end), max_relative = 0.05, epsilon = 0.05);
        }
    }

    #[test]
    fn test_example_names() {
        assert_eq!(
            "quadraticforcing".parse::<IVPExample>().unwrap(),
            IVPExample::QuadraticForcing
        );
        assert_eq!("Logistic".parse::<IVPExample>().unwrap(), IVPExample::Logistic);
        assert_eq!(IVPExample::Gaussian.to_string(), "Gaussian");
        assert_eq!(IVPExample::QuadraticForcing.rhs().name(), "y - x^2 + 1");
        assert_eq!(IVPExample::iter().count(), 6);
    }
}
