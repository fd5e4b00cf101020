use std::time::Duration;

use tilefall_core::{
    Command, EntityId, Event, HorizontalDir, PixelPoint, ProjectileFate, WorldConfig,
};
use tilefall_world::{self as world, query, BitmapSource, LoadError, World, SOLID_SAMPLE};

fn bitmap(columns: u32, rows: u32, solid: impl Fn(u32, u32) -> bool) -> BitmapSource {
    let mut samples = vec![0xff_u8; columns as usize * rows as usize];
    for y in 0..rows {
        for x in 0..columns {
            if solid(x, y) {
                samples[y as usize * columns as usize + x as usize] = SOLID_SAMPLE;
            }
        }
    }
    BitmapSource::new(columns, rows, samples).expect("valid bitmap")
}

fn config() -> WorldConfig {
    WorldConfig {
        grid_columns: 20,
        grid_rows: 20,
        ..WorldConfig::default()
    }
}

/// Floor row at tile y = 10 (surface at pixel 320) plus a wall column at
/// tile x = 10 rising one tile above the floor.
fn walled_world() -> World {
    let source = bitmap(20, 20, |x, y| y == 10 || (x == 10 && y == 9));
    World::from_bitmap(&source, config()).expect("world builds")
}

fn tick(world: &mut World, events: &mut Vec<Event>) {
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(20),
        },
        events,
    );
}

fn spawn(world: &mut World, events: &mut Vec<Event>, x: i32, y: i32) -> EntityId {
    world::apply(
        world,
        Command::SpawnCharacter {
            pixel: PixelPoint::new(x, y),
        },
        events,
    );
    events
        .iter()
        .rev()
        .find_map(|event| match event {
            Event::CharacterSpawned { entity, .. } => Some(*entity),
            _ => None,
        })
        .expect("spawn event emitted")
}

#[test]
fn from_bitmap_rejects_dimension_mismatch() {
    let source = bitmap(10, 10, |_, _| false);
    let error = World::from_bitmap(&source, config()).unwrap_err();
    assert_eq!(
        error,
        LoadError::DimensionMismatch {
            columns: 10,
            rows: 10,
            expected_columns: 20,
            expected_rows: 20,
        }
    );
}

#[test]
fn walking_character_snaps_against_wall() {
    let mut world = walled_world();
    let mut events = Vec::new();
    let player = spawn(&mut world, &mut events, 200, 288);

    world::apply(
        &mut world,
        Command::SetDirection {
            entity: player,
            direction: HorizontalDir::Right,
        },
        &mut events,
    );

    for _ in 0..40 {
        tick(&mut world, &mut events);
    }

    let snapshot = query::character_view(&world).into_vec()[0];
    assert_eq!(snapshot.rect.right(), 320, "snapped to the wall's left edge");
    assert_eq!(snapshot.direction, HorizontalDir::Still);
    assert!(snapshot.grounded);
}

#[test]
fn character_falls_lands_and_jumps_once() {
    let mut world = walled_world();
    let mut events = Vec::new();
    let player = spawn(&mut world, &mut events, 100, 100);

    events.clear();
    for _ in 0..120 {
        tick(&mut world, &mut events);
    }

    assert!(events.contains(&Event::GroundedChanged {
        entity: player,
        grounded: true,
    }));
    let snapshot = query::character_view(&world).into_vec()[0];
    assert_eq!(snapshot.rect.bottom(), 320, "resting on the floor surface");
    assert!(snapshot.grounded);

    events.clear();
    world::apply(&mut world, Command::Jump { entity: player }, &mut events);
    assert_eq!(events, vec![Event::Jumped { entity: player }]);

    // A second jump request mid-air is ignored.
    tick(&mut world, &mut events);
    events.clear();
    world::apply(&mut world, Command::Jump { entity: player }, &mut events);
    assert!(events.is_empty());

    let airborne = query::character_view(&world).into_vec()[0];
    assert!(airborne.rect.bottom() < 320, "jump lifted the character");
}

#[test]
fn projectile_aimed_outward_is_removed_when_it_leaves_the_world() {
    let mut world = walled_world();
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::FireProjectile {
            origin: PixelPoint::new(5, 100),
            angle: std::f32::consts::PI, // straight left, out of the world
            speed: 10.0,
            shooter: EntityId::new(99),
        },
        &mut events,
    );

    events.clear();
    tick(&mut world, &mut events);

    assert!(events.iter().any(|event| matches!(
        event,
        Event::ProjectileRemoved {
            fate: ProjectileFate::LeftWorld,
            ..
        }
    )));
    assert!(query::projectile_view(&world).into_vec().is_empty());
}

#[test]
fn projectile_hits_enemy_but_never_its_shooter() {
    let mut world = walled_world();
    let mut events = Vec::new();
    let shooter = spawn(&mut world, &mut events, 100, 288);
    let enemy = spawn(&mut world, &mut events, 200, 288);

    world::apply(
        &mut world,
        Command::FireProjectile {
            origin: PixelPoint::new(130, 300),
            angle: 0.0, // straight right, toward the enemy
            speed: 10.0,
            shooter,
        },
        &mut events,
    );

    events.clear();
    for _ in 0..20 {
        tick(&mut world, &mut events);
    }

    assert!(events.contains(&Event::ProjectileRemoved {
        entity: EntityId::new(2),
        fate: ProjectileFate::HitEntity { entity: enemy },
    }));
}

#[test]
fn projectile_fired_into_the_floor_hits_a_tile() {
    let mut world = walled_world();
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::FireProjectile {
            origin: PixelPoint::new(100, 250),
            angle: -std::f32::consts::FRAC_PI_2, // straight down
            speed: 10.0,
            shooter: EntityId::new(99),
        },
        &mut events,
    );

    events.clear();
    for _ in 0..20 {
        tick(&mut world, &mut events);
    }

    assert!(events.iter().any(|event| matches!(
        event,
        Event::ProjectileRemoved {
            fate: ProjectileFate::HitTile,
            ..
        }
    )));
    assert!(query::projectile_view(&world).into_vec().is_empty());
}
