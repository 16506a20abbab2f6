#![allow(non_snake_case)]
use RustedEuler::Examples::euler_examples::euler_examples;
use RustedEuler::numerical::Euler_task::{EulerTask, create_template_file};
use std::path::Path;

/// `RustedEuler <task file>` runs a task, `RustedEuler --template <file>` writes a commented
/// task template, no arguments runs the built-in demo
fn main() {
    let args: Vec<String> = std::env::args().collect();
    match args.as_slice() {
        [_, flag, path] if flag == "--template" => match create_template_file(Path::new(path)) {
            Ok(()) => println!("template written to {}", path),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        [_, path] => {
            let result = match EulerTask::from_file(path) {
                Ok(task) => task.run(),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = result {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        _ => {
            let example = 0;
            euler_examples(example);
        }
    }
}
