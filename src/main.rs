//! Tactics client
//!
//! Loads config, sprite catalog and scenario, draws the board and control
//! panel, then runs the input/tick/render loop until the window closes.

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::info;

mod assets;
mod commands;
mod config;
mod effects;
mod error;
mod game_state;
mod input;
mod messages;
mod render;
mod scene;
mod text;
mod ui;
mod world;

use assets::AssetCatalog;
use commands::LocalCommands;
use config::ClientConfig;
use error::ClientError;
use game_state::GameState;
use input::ClientAction;
use render::{render_scene, to_sdl_color, TextureBank};
use world::RenderWorld;

const WELCOME_MESSAGE: &str = "Welcome! Click a character to select it.";

/// `RUST_LOG` wins; otherwise everything at info and above
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<(), ClientError> {
    init_logging();

    let config = ClientConfig::load(std::env::args().nth(1).map(PathBuf::from))?;
    let catalog = AssetCatalog::load_from_file(&config.asset_manifest)?;
    let mut game = GameState::load_from_file(&config.scenario)?;
    info!(
        "Scenario: {} cells, {} characters",
        game.terrain.len(),
        game.characters.len()
    );

    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;
    let _image_context = sdl2::image::init(sdl2::image::InitFlag::PNG)?;

    let window = video_subsystem
        .window(&config.title, config.width, config.height)
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;

    let mut canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
    let texture_creator = canvas.texture_creator();
    let mut event_pump = sdl_context.event_pump()?;

    let mut world = RenderWorld::new(catalog, config.ui_layout.clone(), config.tile_size);
    let mut textures = TextureBank::load(&texture_creator, world.assets());

    world.draw_terrain(&game.terrain);
    world.draw_textures(&game.textures);
    world.draw_characters(&mut game.characters);
    world.draw_ui()?;
    world.update_ui(game.selected(), &game)?;
    world.show_message(WELCOME_MESSAGE);

    let mut commands = LocalCommands;
    let background = to_sdl_color(config.background_color, 1.0);
    let frame_time = Duration::from_secs(1) / config.fps.max(1);
    let mut last_frame = Instant::now();

    info!("Entering frame loop at {} fps", config.fps);
    'running: loop {
        for action in input::poll_actions(&mut event_pump) {
            match action {
                ClientAction::Quit => break 'running,
                ClientAction::Pointer(pointer) => {
                    if let Some(event) = world.handle_pointer(pointer, &game) {
                        commands::dispatch(&mut commands, event, &mut world, &mut game)?;
                    }
                }
            }
        }

        let now = Instant::now();
        let delta = config.frame_delta(now.duration_since(last_frame).as_secs_f32());
        last_frame = now;
        world.tick(delta)?;

        canvas.set_draw_color(background);
        canvas.clear();
        render_scene(&mut canvas, world.scene(), &mut textures)?;
        canvas.present();

        std::thread::sleep(frame_time);
    }

    info!("Shutting down");
    Ok(())
}
