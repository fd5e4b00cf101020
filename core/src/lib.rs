#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilefall engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. It also owns the pixel- and tile-space
//! geometry primitives every crate agrees on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by exactly one fixed step.
    Tick {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Updates the horizontal movement intent of a character.
    SetDirection {
        /// Identifier of the character changing direction.
        entity: EntityId,
        /// New horizontal intent for the character.
        direction: HorizontalDir,
    },
    /// Requests that a character jump, honored only while grounded.
    Jump {
        /// Identifier of the character attempting to jump.
        entity: EntityId,
    },
    /// Requests placement of a solid tile at a world-pixel location.
    PlaceTile {
        /// World-pixel location resolved by the requesting tool.
        pixel: PixelPoint,
    },
    /// Requests removal of the tile covering a world-pixel location.
    RemoveTile {
        /// World-pixel location resolved by the requesting tool.
        pixel: PixelPoint,
    },
    /// Requests that a new character be spawned at a world-pixel location.
    SpawnCharacter {
        /// Top-left pixel of the spawned character's bounding box.
        pixel: PixelPoint,
    },
    /// Requests that a projectile be fired along a fixed angle.
    FireProjectile {
        /// Top-left pixel of the projectile's initial bounding box.
        origin: PixelPoint,
        /// Firing angle in radians, measured counter-clockwise from the
        /// positive x axis with screen-space y pointing down.
        angle: f32,
        /// Distance travelled per simulation step, in pixels.
        speed: f32,
        /// Entity excluded from the projectile's collision checks.
        shooter: EntityId,
    },
    /// Selects the entity the viewport recenters on every tick.
    TrackEntity {
        /// Identifier of the entity to follow.
        entity: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one step.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a solid tile now occupies a grid cell.
    TilePlaced {
        /// Grid coordinate of the placed tile.
        coord: TileCoord,
    },
    /// Confirms that a grid cell was cleared.
    TileRemoved {
        /// Grid coordinate of the removed tile.
        coord: TileCoord,
    },
    /// Reports that a tile edit request was rejected.
    TileEditRejected {
        /// World-pixel location provided in the request.
        pixel: PixelPoint,
        /// Specific reason the edit failed.
        reason: TileEditError,
    },
    /// Confirms that a character entered the active entity set.
    CharacterSpawned {
        /// Identifier assigned to the character by the world.
        entity: EntityId,
        /// Initial bounding box of the character.
        rect: PixelRect,
    },
    /// Confirms that a grounded character launched into the air.
    Jumped {
        /// Identifier of the character that jumped.
        entity: EntityId,
    },
    /// Reports a transition between the grounded and airborne states.
    GroundedChanged {
        /// Identifier of the character whose state changed.
        entity: EntityId,
        /// Whether the character is grounded after the transition.
        grounded: bool,
    },
    /// Confirms that a projectile entered the active entity set.
    ProjectileSpawned {
        /// Identifier assigned to the projectile by the world.
        entity: EntityId,
        /// Initial bounding box of the projectile.
        rect: PixelRect,
    },
    /// Confirms that a projectile left the active entity set.
    ProjectileRemoved {
        /// Identifier of the removed projectile.
        entity: EntityId,
        /// Condition that ended the projectile's flight.
        fate: ProjectileFate,
    },
    /// Announces that the viewport window moved to a new position.
    ViewportMoved {
        /// Window rect after recentering and clamping.
        window: PixelRect,
    },
}

/// Reasons a tile edit request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileEditError {
    /// The requested pixel lies outside the world bounds.
    OutOfBounds,
}

/// Conditions that remove a projectile from the active entity set.
///
/// The world evaluates the conditions in declaration order every tick and the
/// first qualifying one wins: world bounds, then entities, then tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileFate {
    /// The projectile's rect stopped intersecting the world bounds.
    LeftWorld,
    /// The projectile overlapped an entity outside its exclusion list.
    HitEntity {
        /// Identifier of the entity that was struck.
        entity: EntityId,
    },
    /// The projectile overlapped a solid tile.
    HitTile,
}

/// Unique identifier assigned to a dynamic entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Horizontal movement intent of a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalDir {
    /// Movement toward decreasing x coordinates.
    Left,
    /// No horizontal movement.
    Still,
    /// Movement toward increasing x coordinates.
    Right,
}

impl HorizontalDir {
    /// Sign applied to the per-step walk speed.
    #[must_use]
    pub const fn signum(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Still => 0,
            Self::Right => 1,
        }
    }
}

/// Location of a single pixel in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal pixel coordinate.
    pub x: i32,
    /// Vertical pixel coordinate, increasing downward.
    pub y: i32,
}

impl PixelPoint {
    /// Creates a new pixel point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle expressed in world pixels.
///
/// The rect is anchored at its top-left corner; `right` and `bottom` are the
/// exclusive far edges, so two rects whose edges merely touch do not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl PixelRect {
    /// Constructs a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Left edge of the rectangle.
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.left
    }

    /// Top edge of the rectangle.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.top
    }

    /// Width of the rectangle in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the rectangle in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Exclusive right edge of the rectangle.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Exclusive bottom edge of the rectangle.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Center of the rectangle, rounded toward the top-left.
    #[must_use]
    pub const fn center(&self) -> PixelPoint {
        PixelPoint::new(self.left + self.width / 2, self.top + self.height / 2)
    }

    /// Moves the left edge, preserving the size.
    pub fn set_left(&mut self, left: i32) {
        self.left = left;
    }

    /// Moves the top edge, preserving the size.
    pub fn set_top(&mut self, top: i32) {
        self.top = top;
    }

    /// Moves the rect so its exclusive right edge lands on `right`.
    pub fn set_right(&mut self, right: i32) {
        self.left = right - self.width;
    }

    /// Moves the rect so its exclusive bottom edge lands on `bottom`.
    pub fn set_bottom(&mut self, bottom: i32) {
        self.top = bottom - self.height;
    }

    /// Returns a copy of the rect shifted by the provided deltas.
    #[must_use]
    pub const fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            width: self.width,
            height: self.height,
        }
    }

    /// Shifts the rect in place by the provided deltas.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.left += dx;
        self.top += dy;
    }

    /// Reports whether the point lies inside the rect.
    #[must_use]
    pub const fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }

    /// Reports whether the rects overlap with strictly positive area.
    #[must_use]
    pub const fn intersects(&self, other: &PixelRect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Converts a world-pixel location into the grid coordinate covering it.
    ///
    /// Returns `None` for pixels above or left of the world origin, which no
    /// cell covers.
    #[must_use]
    pub fn from_pixel(point: PixelPoint, tile_size: u32) -> Option<Self> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let size = tile_size as i32;
        Some(Self::new(
            (point.x / size) as u32,
            (point.y / size) as u32,
        ))
    }

    /// Top-left world pixel of the cell; exact inverse of [`Self::from_pixel`]
    /// on tile-aligned inputs.
    #[must_use]
    pub const fn to_pixel(self, tile_size: u32) -> PixelPoint {
        PixelPoint::new(
            (self.x * tile_size) as i32,
            (self.y * tile_size) as i32,
        )
    }

    /// Bounding box of the cell in world pixels.
    #[must_use]
    pub const fn bounding_box(self, tile_size: u32) -> PixelRect {
        let origin = self.to_pixel(tile_size);
        PixelRect::new(origin.x, origin.y, tile_size as i32, tile_size as i32)
    }
}

/// Rectangular query window expressed in tile coordinates.
///
/// Enumeration queries treat the far edges as **inclusive**: a window of
/// extent zero still covers the single cell at its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileWindow {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl TileWindow {
    /// Constructs a window from its origin cell and extent in whole tiles.
    #[must_use]
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Leftmost column covered by the window.
    #[must_use]
    pub const fn left(&self) -> u32 {
        self.left
    }

    /// Topmost row covered by the window.
    #[must_use]
    pub const fn top(&self) -> u32 {
        self.top
    }

    /// Horizontal extent beyond the origin column.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Vertical extent beyond the origin row.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Converts a pixel-space rect into tile space by flooring each component.
    ///
    /// Portions above or left of the world origin are trimmed away since no
    /// cell covers them.
    #[must_use]
    pub fn from_pixel_rect(rect: PixelRect, tile_size: u32) -> Self {
        let size = i64::from(tile_size);
        let floor = |value: i32| i64::from(value).div_euclid(size);
        let left = floor(rect.left()).max(0);
        let top = floor(rect.top()).max(0);
        Self {
            left: left as u32,
            top: top as u32,
            width: floor(rect.width()).max(0) as u32,
            height: floor(rect.height()).max(0) as u32,
        }
    }

    /// Clamps the window so every covered cell, including the inclusive far
    /// edges, lies inside a grid of the provided dimensions.
    ///
    /// Returns `None` when the grid holds no cells or the window starts
    /// entirely beyond it.
    #[must_use]
    pub fn clamped_to(self, columns: u32, rows: u32) -> Option<Self> {
        if columns == 0 || rows == 0 || self.left >= columns || self.top >= rows {
            return None;
        }
        Some(Self {
            left: self.left,
            top: self.top,
            width: self.width.min(columns - 1 - self.left),
            height: self.height.min(rows - 1 - self.top),
        })
    }
}

/// Capability exposed by everything that occupies space in the world.
pub trait HasBoundingBox {
    /// Current bounding box of the value in world pixels.
    fn bounding_box(&self) -> PixelRect;
}

impl HasBoundingBox for PixelRect {
    fn bounding_box(&self) -> PixelRect {
        *self
    }
}

/// Immutable tuning constants the world is constructed with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Pixel edge length of one square tile.
    pub tile_size: u32,
    /// Number of tile columns in the world grid.
    pub grid_columns: u32,
    /// Number of tile rows in the world grid.
    pub grid_rows: u32,
    /// Downward acceleration applied per step while airborne.
    pub gravity: f32,
    /// Cap on downward velocity in pixels per step.
    pub max_fall_speed: f32,
    /// Upward velocity granted by a jump, in pixels per step.
    pub jump_speed: f32,
    /// Horizontal distance a character covers per step, in pixels.
    pub walk_speed: i32,
    /// Duration of one fixed simulation step.
    pub tick: Duration,
    /// Upper bound on catch-up steps executed per rendered frame.
    pub max_frame_skip: u32,
    /// Width of the viewport window in pixels, fixed to the display size.
    pub view_width: i32,
    /// Height of the viewport window in pixels, fixed to the display size.
    pub view_height: i32,
}

impl WorldConfig {
    /// Total width of the world in pixels.
    #[must_use]
    pub const fn world_width(&self) -> i32 {
        (self.grid_columns * self.tile_size) as i32
    }

    /// Total height of the world in pixels.
    #[must_use]
    pub const fn world_height(&self) -> i32 {
        (self.grid_rows * self.tile_size) as i32
    }

    /// Bounding box of the entire world in pixels.
    #[must_use]
    pub const fn world_bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.world_width(), self.world_height())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            grid_columns: 100,
            grid_rows: 100,
            gravity: 0.2,
            max_fall_speed: 30.0,
            jump_speed: 6.0,
            walk_speed: 3,
            tick: Duration::from_millis(20),
            max_frame_skip: 10,
            view_width: 1024,
            view_height: 768,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EntityId, HorizontalDir, PixelPoint, PixelRect, ProjectileFate, TileCoord, TileEditError,
        TileWindow, WorldConfig,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(7));
    }

    #[test]
    fn geometry_round_trips_through_bincode() {
        assert_round_trip(&PixelRect::new(-3, 10, 30, 32));
        assert_round_trip(&TileCoord::new(4, 9));
        assert_round_trip(&TileWindow::new(1, 2, 5, 5));
    }

    #[test]
    fn error_types_round_trip_through_bincode() {
        assert_round_trip(&TileEditError::OutOfBounds);
        assert_round_trip(&ProjectileFate::HitEntity {
            entity: EntityId::new(3),
        });
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let floor = PixelRect::new(100, 200, 32, 32);
        let mut body = PixelRect::new(70, 200, 30, 32);
        body.set_right(floor.left());
        assert!(!body.intersects(&floor));

        body.translate(1, 0);
        assert!(body.intersects(&floor));
    }

    #[test]
    fn edge_setters_preserve_size() {
        let mut rect = PixelRect::new(0, 0, 30, 32);
        rect.set_bottom(96);
        assert_eq!(rect.top(), 64);
        assert_eq!(rect.height(), 32);
        rect.set_right(100);
        assert_eq!(rect.left(), 70);
        assert_eq!(rect.width(), 30);
    }

    #[test]
    fn tile_pixel_conversions_are_inverse_on_aligned_inputs() {
        let tile_size = 32;
        for coord in [TileCoord::new(0, 0), TileCoord::new(3, 7), TileCoord::new(99, 99)] {
            let pixel = coord.to_pixel(tile_size);
            assert_eq!(TileCoord::from_pixel(pixel, tile_size), Some(coord));
        }

        let unaligned = PixelPoint::new(33, 95);
        assert_eq!(
            TileCoord::from_pixel(unaligned, tile_size),
            Some(TileCoord::new(1, 2))
        );
        assert_eq!(TileCoord::from_pixel(PixelPoint::new(-1, 0), tile_size), None);
    }

    #[test]
    fn pixel_window_floors_each_component() {
        let rect = PixelRect::new(65, 31, 160, 160);
        let window = TileWindow::from_pixel_rect(rect, 32);
        assert_eq!(window, TileWindow::new(2, 0, 5, 5));
    }

    #[test]
    fn window_clamp_keeps_inclusive_far_edge_in_bounds() {
        let window = TileWindow::new(97, 98, 5, 5);
        let clamped = window.clamped_to(100, 100).expect("window inside grid");
        assert_eq!(clamped.left() + clamped.width(), 99);
        assert_eq!(clamped.top() + clamped.height(), 99);

        assert!(TileWindow::new(100, 0, 1, 1).clamped_to(100, 100).is_none());
        assert!(TileWindow::new(0, 0, 1, 1).clamped_to(0, 0).is_none());
    }

    #[test]
    fn direction_signum_matches_intent() {
        assert_eq!(HorizontalDir::Left.signum(), -1);
        assert_eq!(HorizontalDir::Still.signum(), 0);
        assert_eq!(HorizontalDir::Right.signum(), 1);
    }

    #[test]
    fn default_config_matches_original_tuning() {
        let config = WorldConfig::default();
        assert_eq!(config.world_width(), 3200);
        assert_eq!(config.world_height(), 3200);
        assert_eq!(config.world_bounds(), PixelRect::new(0, 0, 3200, 3200));
    }
}
