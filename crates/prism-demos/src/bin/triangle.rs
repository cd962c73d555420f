use std::process::ExitCode;

use prism_demos::{configs, scenes};
use prism_engine::launch;

fn main() -> ExitCode {
    match scenes::triangle_scene() {
        Ok(scene) => launch::run_scene(configs::triangle(), scene),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
