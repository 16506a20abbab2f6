// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! Right-hand sides dy/dx = f(x, y) and closed-form solutions y = g(x) used by the Euler family solvers.
//! Both are plain numeric callables: the solvers only borrow them and never mutate anything.

/// Trait for representing the right-hand side of a scalar ODE dy/dx = f(x, y)
pub trait ODEFunction: Sync {
    /// Evaluate f at point (x, y)
    fn eval(&self, x: f64, y: f64) -> f64;

    /// Get function name for tables, plots and logging
    fn name(&self) -> &str {
        "f(x, y)"
    }
}

/// Trait for a closed-form (exact) solution y = g(x)
pub trait ExactSolution: Sync {
    /// Evaluate g at point x
    fn eval(&self, x: f64) -> f64;

    fn name(&self) -> &str {
        "exact"
    }
}

/// Simple wrapper for closures f(x, y)
pub struct ClosureODE<F>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    func: F,
    name: String,
}

impl<F> ClosureODE<F>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    pub fn new(func: F, name: &str) -> Self {
        Self {
            func,
            name: name.to_string(),
        }
    }
}

impl<F> ODEFunction for ClosureODE<F>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    fn eval(&self, x: f64, y: f64) -> f64 {
        (self.func)(x, y)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Simple wrapper for closures g(x)
pub struct ClosureExact<G>
where
    G: Fn(f64) -> f64 + Sync,
{
    func: G,
    name: String,
}

impl<G> ClosureExact<G>
where
    G: Fn(f64) -> f64 + Sync,
{
    pub fn new(func: G, name: &str) -> Self {
        Self {
            func,
            name: name.to_string(),
        }
    }
}

impl<G> ExactSolution for ClosureExact<G>
where
    G: Fn(f64) -> f64 + Sync,
{
    fn eval(&self, x: f64) -> f64 {
        (self.func)(x)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_ode_eval_and_name() {
        let f = ClosureODE::new(|x, y| y - x * x + 1.0, "y - x^2 + 1");
        assert_eq!(f.eval(0.0, 0.5), 1.5);
        assert_eq!(f.eval(1.0, 2.0), 2.0);
        assert_eq!(f.name(), "y - x^2 + 1");
    }

    #[test]
    fn test_closure_exact_eval_and_name() {
        let g = ClosureExact::new(|x: f64| (x + 1.0).powi(2) - 0.5 * x.exp(), "(x+1)^2 - 0.5exp(x)");
        assert_eq!(g.eval(0.0), 0.5);
        assert_eq!(g.name(), "(x+1)^2 - 0.5exp(x)");
    }

    #[test]
    fn test_trait_objects() {
        let f: Box<dyn ODEFunction> = Box::new(ClosureODE::new(|_x, y| -y, "-y"));
        let g: Box<dyn ExactSolution> = Box::new(ClosureExact::new(|x: f64| (-x).exp(), "exp(-x)"));
        assert_eq!(f.eval(3.0, 2.0), -2.0);
        assert_eq!(g.eval(0.0), 1.0);
    }
}
