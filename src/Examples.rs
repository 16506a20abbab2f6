//! examples of usage of RustedEuler
/// Euler family examples: comparison runs, single method runs, task files
pub mod euler_examples;
