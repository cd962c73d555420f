use std::process::ExitCode;

use prism_demos::{configs, scenes};
use prism_engine::launch;

fn main() -> ExitCode {
    match scenes::point_scene() {
        Ok(scene) => launch::run_scene(configs::point(), scene),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
