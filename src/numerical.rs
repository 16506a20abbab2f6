/// Right-hand side f(x, y) and exact solution g(x) traits with closure wrappers
pub mod ode_functions;
/// FIXED-STEP EULER FAMILY
/// Euler, Improved Euler (Heun), Modified Euler (midpoint), Improved Modified Euler and AIME,
/// all driven by one stepping loop over a uniform grid
/// Example#1
/// ```
/// use RustedEuler::numerical::Euler_family::{StepGrid, euler};
/// use RustedEuler::numerical::ode_functions::ClosureODE;
/// let f = ClosureODE::new(|x, y| y - x * x + 1.0, "y - x^2 + 1");
/// let grid = StepGrid::new(0.0, 0.5, 2.0, 0.2).unwrap();
/// let trajectory = euler(&f, &grid).unwrap();
/// assert_eq!(trajectory.len(), 11);
/// assert!((trajectory.y()[1] - 0.8).abs() < 1e-12);
/// ```
pub mod Euler_family;
/// reference curve selection (exact solution or AIME) and absolute error series
pub mod Euler_comparison;
/// general api for the Euler family: solve all methods, print tables, plot and save results
/// Example#1
/// ```
/// use RustedEuler::numerical::Euler_api::EulerFamilySolver;
/// use RustedEuler::numerical::Examples_and_utils::IVPExample;
/// let mut solver = EulerFamilySolver::from_example(IVPExample::QuadraticForcing);
/// solver.disable_logging();
/// let report = solver.solve().unwrap();
/// println!("{}", report.comparison_table());
/// println!("{}", report.error_table());
/// ```
pub mod Euler_api;
/// task documents: problem, grid, solver and output settings
pub mod Euler_task;
/// catalog of scalar IVPs with exact solutions
pub mod Examples_and_utils;
