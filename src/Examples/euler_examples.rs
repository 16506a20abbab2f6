// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
use crate::numerical::Euler_api::EulerFamilySolver;
use crate::numerical::Euler_family::{AimeScheme, EulerMethod, StepGrid, euler, improved_euler};
use crate::numerical::Euler_task::{EulerTask, TEMPLATE};
use crate::numerical::Examples_and_utils::IVPExample;
use crate::numerical::ode_functions::{ClosureExact, ClosureODE};
use strum::IntoEnumIterator;

pub fn euler_examples(example: usize) {
    match example {
        0 => {
            // the shortest way: a problem from the catalog, all five methods, exact reference
            let mut solver = EulerFamilySolver::from_example(IVPExample::QuadraticForcing);
            match solver.solve() {
                Ok(_) => solver.print_result(),
                Err(e) => println!("{}", e),
            }
            if let Err(e) = solver.plot_result("quadratic_forcing", true) {
                println!("plotting failed: {}", e);
            }
        }
        1 => {
            // user-defined right-hand side without exact solution: AIME becomes the reference
            let f = ClosureODE::new(|x: f64, y: f64| x * x - y, "x^2 - y");
            let mut solver = EulerFamilySolver::new(Box::new(f), 0.0, 1.0, 3.0, 0.1);
            solver.set_parallel(true);
            match solver.solve() {
                Ok(report) => {
                    println!("{}", report.comparison_table());
                    println!("{}", report.error_table());
                }
                Err(e) => println!("{}", e),
            }
        }
        2 => {
            // single method with exact values and error statistics
            let f = ClosureODE::new(|x: f64, y: f64| x + y, "x + y");
            let g = ClosureExact::new(|x: f64| 2.0 * x.exp() - x - 1.0, "2*exp(x) - x - 1");
            let mut solver = EulerFamilySolver::new(Box::new(f), 0.0, 1.0, 1.0, 0.1);
            solver.set_exact_solution(Box::new(g));
            match solver.solve_single(EulerMethod::ImprovedModifiedEuler) {
                Ok(report) => {
                    println!("{}", report.table());
                    if let Some(stats) = report.statistics {
                        println!(
                            "max error {:.6e}, final error {:.6e}, mean error {:.6e}",
                            stats.max, stats.final_error, stats.mean
                        );
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        3 => {
            // step rules called directly; halving h shows the order of each method
            let example = IVPExample::LinearGrowth;
            let f = example.rhs();
            let g = example.exact();
            for h in [0.1, 0.05, 0.025] {
                let grid = match StepGrid::new(0.0, 1.0, 1.0, h) {
                    Ok(grid) => grid,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let e1 = euler(f.as_ref(), &grid).map(|t| (t.last().1 - g.eval(1.0)).abs());
                let e2 = improved_euler(f.as_ref(), &grid).map(|t| (t.last().1 - g.eval(1.0)).abs());
                println!("h = {:<6} Euler error {:?}, Improved Euler error {:?}", h, e1, e2);
            }
        }
        4 => {
            // every catalog problem with the nested AIME scheme
            for problem in IVPExample::iter() {
                let mut solver = EulerFamilySolver::from_example(problem);
                solver.set_aime_scheme(AimeScheme::NestedMidpoint);
                solver.set_log_level(log::LevelFilter::Warn);
                match solver.solve() {
                    Ok(report) => {
                        println!("{}: y' = {}", problem, problem.expression());
                        println!("{}", report.error_table());
                    }
                    Err(e) => println!("{}: {}", problem, e),
                }
            }
        }
        5 => {
            // task document: the same settings a task file would carry
            match TEMPLATE.parse::<EulerTask>() {
                Ok(task) => {
                    if let Err(e) = task.run() {
                        println!("{}", e);
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
        _ => println!("no such example"),
    }
}
