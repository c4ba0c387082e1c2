mod app;
mod gpu;

use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

use room_wave::config::{GRID_HEIGHT, GRID_WIDTH};
use room_wave::simulation::{Engine, RoomDefinition};

use crate::app::App;

fn main() {
    env_logger::init();

    let room_path = std::env::args().nth(1).map(PathBuf::from);

    let mut engine =
        Engine::new(GRID_WIDTH, GRID_HEIGHT, false).expect("default grid dimensions are positive");

    if let Some(path) = &room_path {
        match RoomDefinition::from_file(path) {
            Ok(room) => {
                log::info!(
                    "Loaded room {} ({}x{})",
                    path.display(),
                    room.width(),
                    room.height()
                );
                engine.load_room(&room);
            }
            Err(err) => {
                log::error!("Failed to load room {}: {err}", path.display());
                std::process::exit(1);
            }
        }
    }

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(engine, room_path);
    event_loop.run_app(&mut app).expect("Event loop error");
}
