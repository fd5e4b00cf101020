#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Tilefall simulation core.
//!
//! The world owns the tile grid, the viewport, and every dynamic entity.
//! Adapters and systems mutate it exclusively through [`apply`], which
//! executes one [`Command`] and appends the resulting [`Event`] values;
//! read access goes through the [`query`] module. Each tick is atomic with
//! respect to the grid: tile edits arrive as commands and therefore never
//! interleave with a tick's collision queries.

pub mod camera;
pub mod grid;
mod motion;

pub use camera::Viewport;
pub use grid::{BitmapSource, LoadError, Tile, TileGrid, TileLayer, VisualHandle, SOLID_SAMPLE};

use tilefall_core::{
    Command, EntityId, Event, PixelPoint, PixelRect, ProjectileFate, TileCoord, TileEditError,
    WorldConfig,
};

use motion::{Body, MotionProfile, ProjectileBody};

/// Width of a character's bounding box in pixels.
pub const CHARACTER_WIDTH: i32 = 30;
/// Height of a character's bounding box in pixels.
pub const CHARACTER_HEIGHT: i32 = 32;
/// Edge length of a projectile's square bounding box in pixels.
pub const PROJECTILE_SIZE: i32 = 5;

#[derive(Clone, Copy, Debug)]
struct Character {
    id: EntityId,
    body: Body,
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    id: EntityId,
    body: ProjectileBody,
    shooter: EntityId,
}

/// Represents the authoritative Tilefall world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    profile: MotionProfile,
    grid: TileGrid,
    viewport: Viewport,
    characters: Vec<Character>,
    projectiles: Vec<Projectile>,
    next_entity: u32,
    tracked: Option<EntityId>,
    tick_index: u64,
}

impl World {
    /// Builds a world whose grid is sampled from the provided bitmap.
    ///
    /// The bitmap dimensions must match the configured grid dimensions; any
    /// disagreement surfaces as a [`LoadError`] for the caller to handle.
    pub fn from_bitmap(source: &BitmapSource, config: WorldConfig) -> Result<Self, LoadError> {
        if source.columns() != config.grid_columns || source.rows() != config.grid_rows {
            return Err(LoadError::DimensionMismatch {
                columns: source.columns(),
                rows: source.rows(),
                expected_columns: config.grid_columns,
                expected_rows: config.grid_rows,
            });
        }
        let grid = TileGrid::build(source, config.tile_size)?;
        Ok(Self::with_grid(grid, config))
    }

    /// Builds a world with an entirely empty grid of the configured size.
    #[must_use]
    pub fn with_empty_grid(config: WorldConfig) -> Self {
        let grid = TileGrid::empty(config.grid_columns, config.grid_rows, config.tile_size);
        Self::with_grid(grid, config)
    }

    fn with_grid(grid: TileGrid, config: WorldConfig) -> Self {
        Self {
            profile: MotionProfile::from_config(&config),
            viewport: Viewport::new(
                config.view_width,
                config.view_height,
                config.world_width(),
                config.world_height(),
            ),
            grid,
            config,
            characters: Vec::new(),
            projectiles: Vec::new(),
            next_entity: 0,
            tracked: None,
            tick_index: 0,
        }
    }

    fn allocate_entity(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity += 1;
        id
    }

    fn character_mut(&mut self, entity: EntityId) -> Option<&mut Character> {
        self.characters
            .iter_mut()
            .find(|character| character.id == entity)
    }

    fn entity_rect(&self, entity: EntityId) -> Option<PixelRect> {
        self.characters
            .iter()
            .find(|character| character.id == entity)
            .map(|character| character.body.rect)
            .or_else(|| {
                self.projectiles
                    .iter()
                    .find(|projectile| projectile.id == entity)
                    .map(|projectile| projectile.body.rect)
            })
    }

    /// Resolves a world-pixel location to a grid coordinate, or `None` when
    /// the pixel falls outside the world bounds.
    fn tile_coord_at(&self, pixel: PixelPoint) -> Option<TileCoord> {
        if !self.config.world_bounds().contains(pixel) {
            return None;
        }
        TileCoord::from_pixel(pixel, self.config.tile_size)
    }

    fn step_characters(&mut self, out_events: &mut Vec<Event>) {
        let bounds = self.config.world_bounds();
        for character in self.characters.iter_mut() {
            let was_grounded = character.body.grounded;
            motion::resolve(&mut character.body, &self.profile, &self.grid, bounds);
            if character.body.grounded != was_grounded {
                out_events.push(Event::GroundedChanged {
                    entity: character.id,
                    grounded: character.body.grounded,
                });
            }
        }
    }

    fn step_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let bounds = self.config.world_bounds();

        // Snapshot the collision targets up front; removal is deferred to
        // the sweep below so the active set is never mutated mid-iteration.
        let targets: Vec<(EntityId, PixelRect)> = self
            .characters
            .iter()
            .map(|character| (character.id, character.body.rect))
            .collect();

        let mut removals: Vec<(EntityId, ProjectileFate)> = Vec::new();
        for projectile in self.projectiles.iter_mut() {
            projectile.body.advance();
            let exclusion = [projectile.shooter];
            if let Some(fate) = motion::projectile_fate(
                projectile.body.rect,
                bounds,
                &targets,
                &exclusion,
                &self.grid,
            ) {
                removals.push((projectile.id, fate));
            }
        }

        for (entity, fate) in removals {
            self.projectiles.retain(|projectile| projectile.id != entity);
            out_events.push(Event::ProjectileRemoved { entity, fate });
        }
    }

    fn recenter_viewport(&mut self, out_events: &mut Vec<Event>) {
        let Some(rect) = self.tracked.and_then(|entity| self.entity_rect(entity)) else {
            return;
        };
        let before = self.viewport.window();
        let after = self.viewport.update(&rect);
        if after != before {
            out_events.push(Event::ViewportMoved { window: after });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.step_characters(out_events);
            world.step_projectiles(out_events);
            world.recenter_viewport(out_events);
        }
        Command::SetDirection { entity, direction } => {
            if let Some(character) = world.character_mut(entity) {
                character.body.direction = direction;
            }
        }
        Command::Jump { entity } => {
            let profile = world.profile;
            if let Some(character) = world.character_mut(entity) {
                if character.body.jump(&profile) {
                    out_events.push(Event::Jumped { entity });
                }
            }
        }
        Command::PlaceTile { pixel } => match world.tile_coord_at(pixel) {
            Some(coord) => {
                world.grid.place(coord, VisualHandle::ROCK);
                out_events.push(Event::TilePlaced { coord });
            }
            None => out_events.push(Event::TileEditRejected {
                pixel,
                reason: TileEditError::OutOfBounds,
            }),
        },
        Command::RemoveTile { pixel } => match world.tile_coord_at(pixel) {
            Some(coord) => {
                if world.grid.remove(coord).is_some() {
                    out_events.push(Event::TileRemoved { coord });
                }
            }
            None => out_events.push(Event::TileEditRejected {
                pixel,
                reason: TileEditError::OutOfBounds,
            }),
        },
        Command::SpawnCharacter { pixel } => {
            let entity = world.allocate_entity();
            let rect = PixelRect::new(pixel.x, pixel.y, CHARACTER_WIDTH, CHARACTER_HEIGHT);
            world.characters.push(Character {
                id: entity,
                body: Body::airborne(rect),
            });
            if world.tracked.is_none() {
                world.tracked = Some(entity);
            }
            out_events.push(Event::CharacterSpawned { entity, rect });
        }
        Command::FireProjectile {
            origin,
            angle,
            speed,
            shooter,
        } => {
            let entity = world.allocate_entity();
            let body = ProjectileBody::launched(origin, angle, speed, PROJECTILE_SIZE);
            out_events.push(Event::ProjectileSpawned {
                entity,
                rect: body.rect,
            });
            world.projectiles.push(Projectile {
                id: entity,
                body,
                shooter,
            });
        }
        Command::TrackEntity { entity } => {
            world.tracked = Some(entity);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{TileGrid, Viewport, World};
    use tilefall_core::{
        EntityId, HasBoundingBox, HorizontalDir, PixelPoint, PixelRect, TileCoord, WorldConfig,
    };

    /// Configuration constants the world was constructed with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Provides read-only access to the world's tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Provides read-only access to the viewport tracking the world.
    #[must_use]
    pub fn viewport(world: &World) -> &Viewport {
        &world.viewport
    }

    /// Entity the viewport currently recenters on, if any.
    #[must_use]
    pub fn tracked_entity(world: &World) -> Option<EntityId> {
        world.tracked
    }

    /// Number of ticks the world has executed.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Grid coordinate of the solid tile covering the pixel, if any.
    ///
    /// Returns `None` for pixels outside the world bounds, so tools may pass
    /// raw cursor locations without pre-clamping.
    #[must_use]
    pub fn solid_tile_at(world: &World, pixel: PixelPoint) -> Option<TileCoord> {
        let coord = world.tile_coord_at(pixel)?;
        world.grid.tile_at(coord).map(|_| coord)
    }

    /// Captures a read-only view of the active characters.
    #[must_use]
    pub fn character_view(world: &World) -> CharacterView {
        let mut snapshots: Vec<CharacterSnapshot> = world
            .characters
            .iter()
            .map(|character| CharacterSnapshot {
                id: character.id,
                rect: character.body.rect,
                direction: character.body.direction,
                y_velocity: character.body.y_velocity,
                grounded: character.body.grounded,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        CharacterView { snapshots }
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let mut snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                rect: projectile.body.rect,
                angle: projectile.body.angle(),
                speed: projectile.body.speed(),
                shooter: projectile.shooter,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        ProjectileView { snapshots }
    }

    /// Read-only snapshot describing all active characters.
    #[derive(Clone, Debug, Default)]
    pub struct CharacterView {
        snapshots: Vec<CharacterSnapshot>,
    }

    impl CharacterView {
        /// Iterator over the captured snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &CharacterSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<CharacterSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single character's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CharacterSnapshot {
        /// Unique identifier assigned to the character.
        pub id: EntityId,
        /// Current bounding box in world pixels.
        pub rect: PixelRect,
        /// Horizontal movement intent.
        pub direction: HorizontalDir,
        /// Vertical velocity in pixels per step, positive downward.
        pub y_velocity: f32,
        /// Whether downward motion is currently blocked by a tile beneath.
        pub grounded: bool,
    }

    impl HasBoundingBox for CharacterSnapshot {
        fn bounding_box(&self) -> PixelRect {
            self.rect
        }
    }

    /// Read-only snapshot describing all projectiles in flight.
    #[derive(Clone, Debug, Default)]
    pub struct ProjectileView {
        snapshots: Vec<ProjectileSnapshot>,
    }

    impl ProjectileView {
        /// Iterator over the captured snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single projectile's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Unique identifier assigned to the projectile.
        pub id: EntityId,
        /// Current bounding box in world pixels.
        pub rect: PixelRect,
        /// Firing angle in radians.
        pub angle: f32,
        /// Distance travelled per step in pixels.
        pub speed: f32,
        /// Entity excluded from the projectile's collision checks.
        pub shooter: EntityId,
    }

    impl HasBoundingBox for ProjectileSnapshot {
        fn bounding_box(&self) -> PixelRect {
            self.rect
        }
    }
}
