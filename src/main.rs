use std::process::exit;

use log::{error, info, LevelFilter};
use raytrace::{io, render::render};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .init();

    let Some((width, height, input, output)) = io::read_args() else {
        return;
    };

    let scene = match io::read_input(&input) {
        Ok(scene) => scene,
        Err(err) => {
            error!("{}", err);
            exit(1);
        }
    };
    info!(
        "loaded {} objects and {} lights from {}",
        scene.objects.len(),
        scene.lights.len(),
        input
    );

    let film = render(&scene, width, height);

    if let Err(err) = io::save_image(&film, &output) {
        error!("couldn't write {}: {}", output, err);
        exit(1);
    }
    info!("saved {}x{} render to {}", width, height, output);
}
