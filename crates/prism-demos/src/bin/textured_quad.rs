use std::process::ExitCode;

use prism_demos::{configs, scenes};
use prism_engine::launch;

fn main() -> ExitCode {
    match scenes::textured_quad_scene() {
        Ok(scene) => launch::run_scene(configs::textured_quad(), scene),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
