#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Tilefall simulation headlessly.
//!
//! Frames run at the fixed tick rate with a scripted input sequence standing
//! in for a keyboard and mouse: the player walks, jumps, fires the weapon,
//! and edits terrain while the presenter prints periodic frame summaries.

mod clock;
mod scene;
mod terrain;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use tilefall_core::{Command, Event, PixelPoint, WorldConfig};
use tilefall_rendering::{FrameInput, FramePresenter, Scene};
use tilefall_system_control::{Control, ControlInput};
use tilefall_system_tools::{ToolInput, ToolKind, Tools, WielderAnchor};
use tilefall_world::{self as world, query, World};

#[derive(Debug, Parser)]
#[command(name = "tilefall", about = "Headless driver for the Tilefall simulation")]
struct Args {
    /// Number of display frames to simulate.
    #[arg(long, default_value_t = 300)]
    frames: u32,
    /// World width in tiles.
    #[arg(long, default_value_t = 100)]
    columns: u32,
    /// World height in tiles.
    #[arg(long, default_value_t = 100)]
    rows: u32,
    /// Terrain generation seed.
    #[arg(long, default_value_t = 0x7116)]
    seed: u64,
    /// Print a frame summary every N frames (0 disables reporting).
    #[arg(long, default_value_t = 25)]
    report_every: u32,
}

/// Entry point for the Tilefall command-line interface.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = WorldConfig {
        grid_columns: args.columns,
        grid_rows: args.rows,
        ..WorldConfig::default()
    };

    let source = terrain::generate(&config, args.seed).context("generating terrain")?;
    let mut world = World::from_bitmap(&source, config).context("building the world")?;

    let mut events: Vec<Event> = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnCharacter {
            pixel: terrain::spawn_point(&config),
        },
        &mut events,
    );

    let mut control = Control::default();
    let mut tools = Tools::default();
    let mut clock = clock::GameClock::new(config.tick, config.max_frame_skip);
    let mut presenter = SummaryPresenter::new(args.report_every);

    for frame in 0..args.frames {
        let input = demo_input(frame);

        let mut commands = Vec::new();
        control.handle(&events, control_input(&input), &mut commands);
        tools.handle(
            tool_input(&world, &input),
            wielder_anchor(&world, &control),
            |pixel| query::solid_tile_at(&world, pixel).is_some(),
            &mut commands,
        );

        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        for _ in 0..clock.advance(config.tick) {
            world::apply(&mut world, Command::Tick { dt: config.tick }, &mut events);
        }

        let scene = scene::compose(&world)?;
        presenter.present(&scene)?;
        if args.report_every != 0 && frame % args.report_every == 0 {
            report_status(&world);
        }
    }

    Ok(())
}

/// Prints the tracked character's state and the live entity counts.
fn report_status(world: &World) {
    let characters = query::character_view(world);
    let projectiles = query::projectile_view(world);
    let tracked = query::tracked_entity(world)
        .and_then(|entity| characters.iter().find(|snapshot| snapshot.id == entity).copied());

    match tracked {
        Some(player) => println!(
            "  player at ({}, {}) {}  characters {}  projectiles {}",
            player.rect.left(),
            player.rect.top(),
            if player.grounded { "grounded" } else { "airborne" },
            characters.iter().count(),
            projectiles.iter().count(),
        ),
        None => println!(
            "  no tracked player  characters {}  projectiles {}",
            characters.iter().count(),
            projectiles.iter().count(),
        ),
    }
}

/// Scripted stand-in for live input: walk right, jump periodically, fire the
/// weapon once, then place and remove a tile, and finally walk back left.
fn demo_input(frame: u32) -> FrameInput {
    let mut input = FrameInput {
        move_right: frame < 120,
        move_left: frame >= 150,
        jump: frame % 50 == 10,
        ..FrameInput::default()
    };
    match frame {
        130 => {
            input.tool_slot = Some(2);
            input.primary_action = true;
            input.cursor_window_space = Some(Vec2::new(700.0, 300.0));
        }
        200 => {
            input.tool_slot = Some(1);
            input.primary_action = true;
            input.cursor_window_space = Some(Vec2::new(400.0, 200.0));
        }
        210 => {
            input.secondary_action = true;
            input.cursor_window_space = Some(Vec2::new(400.0, 200.0));
        }
        _ => {}
    }
    input
}

fn control_input(input: &FrameInput) -> ControlInput {
    ControlInput::new(input.move_left, input.move_right, input.jump)
}

/// Translates the window-space frame input into the tool system's world-space
/// view of it.
fn tool_input(world: &World, input: &FrameInput) -> ToolInput {
    let cursor_world = input.cursor_window_space.map(|cursor| {
        query::viewport(world).window_to_map(PixelPoint::new(cursor.x as i32, cursor.y as i32))
    });
    ToolInput::new(
        input.primary_action,
        input.secondary_action,
        cursor_world,
        input.tool_slot.and_then(tool_for_slot),
    )
}

/// Maps the one-based tool slots to tools: 1 edits tiles, 2 fires, 3 spawns.
const fn tool_for_slot(slot: u8) -> Option<ToolKind> {
    match slot {
        1 => Some(ToolKind::TileTool),
        2 => Some(ToolKind::Weapon),
        3 => Some(ToolKind::SpawnerTool),
        _ => None,
    }
}

/// Weapon anchor for the steered character, if it is still alive.
fn wielder_anchor(world: &World, control: &Control) -> Option<WielderAnchor> {
    let subject = control.subject()?;
    query::character_view(world)
        .iter()
        .find(|snapshot| snapshot.id == subject)
        .map(|snapshot| WielderAnchor::new(snapshot.id, snapshot.rect.center()))
}

/// Presenter that reports frame statistics instead of drawing.
struct SummaryPresenter {
    every: u32,
    frame: u32,
}

impl SummaryPresenter {
    const fn new(every: u32) -> Self {
        Self { every, frame: 0 }
    }
}

impl FramePresenter for SummaryPresenter {
    fn present(&mut self, scene: &Scene) -> anyhow::Result<()> {
        if self.every != 0 && self.frame % self.every == 0 {
            let window = scene.window;
            println!(
                "frame {:>5}  window ({}, {})  sprites {:>3}  tile revision {}",
                self.frame,
                window.left(),
                window.top(),
                scene.sprites.len(),
                scene.tile_layer_revision,
            );
        }
        self.frame += 1;
        Ok(())
    }
}
