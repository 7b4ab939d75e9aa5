//! Arena Shooter entry point
//!
//! Runs a headless bot match and logs the scoreboard.
//!
//! Usage:
//!   arena-shooter                       # default arena, 60 s
//!   arena-shooter arena.json --secs 30  # custom config and match length

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use arena_shooter::ArenaConfig;
use arena_shooter::consts::SIM_DT;
use arena_shooter::sim::{EntityKind, ItemKind, TickInput, World, tick};
use clap::Parser;
use glam::Vec2;

const BOT_COUNT: usize = 6;

#[derive(Parser)]
#[command(name = "arena-shooter")]
#[command(about = "Headless bot match on the arena shooter simulation")]
struct Args {
    /// JSON arena config (defaults apply to missing fields)
    config: Option<PathBuf>,
    /// Match length in simulated seconds
    #[arg(long, default_value_t = 60.0)]
    secs: f32,
}

fn load_config(path: Option<&Path>) -> Result<ArenaConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(ArenaConfig::from_json(&json)?)
        }
        None => Ok(ArenaConfig::default()),
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let match_secs = args.secs;
    if !(match_secs.is_finite() && match_secs >= 0.0) {
        return Err(format!("--secs must be a non-negative number, got {}", match_secs).into());
    }

    let mut world = World::new(config)?;
    world.spawn_border_walls();

    // Bots on a ring around the arena center
    let center = Vec2::new(world.config.grid.width, world.config.grid.height) * 0.5;
    let ring = center.min_element() * 0.6;
    for i in 0..BOT_COUNT {
        let angle = i as f32 / BOT_COUNT as f32 * std::f32::consts::TAU;
        world.spawn_bot(center + Vec2::from_angle(angle) * ring);
    }
    world.spawn_item(center, ItemKind::Health(arena_shooter::consts::HEALTH_PACK_AMOUNT));
    world.spawn_item(center + Vec2::new(40.0, 0.0), ItemKind::Coins(10));

    let ticks = (match_secs / SIM_DT) as u64;
    log::info!("Running {} ticks ({} s)", ticks, match_secs);
    let input = TickInput::default();
    for _ in 0..ticks {
        tick(&mut world, &input);
        if world.time.tick % 600 == 0 {
            let projectiles = world
                .entities
                .iter()
                .filter(|e| matches!(e.kind, EntityKind::Projectile(_)))
                .count();
            log::info!(
                "t={:.0}s entities={} registered={} projectiles={} grid entries={}",
                world.time.elapsed_secs(),
                world.entities.len(),
                world.collision.len(),
                projectiles,
                world.collision.grid().entry_count()
            );
        }
    }

    println!("{:<8} {:>6} {:>6} {:>6} {:>6}", "player", "kills", "deaths", "coins", "hp");
    for (entity, player) in world.entities.players() {
        println!(
            "{:<8} {:>6} {:>6} {:>6} {:>6}",
            entity.id.to_string(),
            player.kills,
            player.deaths,
            player.coins,
            player.health
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::init();
    log::info!("Arena Shooter (headless) starting...");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
