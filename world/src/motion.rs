//! Gravity integration and two-pass collision resolution shared by every
//! dynamic entity.
//!
//! Each simulation step moves an entity horizontally, resolves against tiles
//! queried from a small local window, then moves it vertically and resolves
//! again, finishing with a one-pixel ground probe that keeps the grounded
//! flag honest when the entity walks off a ledge. Collision candidates come
//! from the grid in a deterministic column-outer, row-inner order and the
//! first overlapping candidate wins.

use tilefall_core::{
    EntityId, HasBoundingBox, HorizontalDir, PixelPoint, PixelRect, ProjectileFate, WorldConfig,
};

use crate::camera::Viewport;
use crate::grid::TileGrid;

/// Side length of the local collision query window, in tiles.
const LOCAL_WINDOW_TILES: u32 = 5;

/// Per-entity motion tunables lifted from the world configuration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MotionProfile {
    pub(crate) speed: i32,
    pub(crate) gravity: f32,
    pub(crate) max_fall_speed: f32,
    pub(crate) jump_speed: f32,
}

impl MotionProfile {
    pub(crate) fn from_config(config: &WorldConfig) -> Self {
        Self {
            speed: config.walk_speed,
            gravity: config.gravity,
            max_fall_speed: config.max_fall_speed,
            jump_speed: config.jump_speed,
        }
    }
}

/// Mutable motion state shared by every gravity-driven entity.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Body {
    pub(crate) rect: PixelRect,
    pub(crate) direction: HorizontalDir,
    pub(crate) y_velocity: f32,
    pub(crate) grounded: bool,
}

impl Body {
    /// Spawns a body in the airborne state, the initial state of every
    /// dynamic entity.
    pub(crate) fn airborne(rect: PixelRect) -> Self {
        Self {
            rect,
            direction: HorizontalDir::Still,
            y_velocity: 0.0,
            grounded: false,
        }
    }

    /// Launches the body upward if it is grounded; a body already in the air
    /// cannot jump again.
    pub(crate) fn jump(&mut self, profile: &MotionProfile) -> bool {
        if !self.grounded {
            return false;
        }
        self.grounded = false;
        self.y_velocity = -profile.jump_speed;
        true
    }
}

/// Computes the 5x5-tile pixel window centered on the target via a transient
/// viewport, clamped to the world bounds like the main camera.
fn local_window(grid: &TileGrid, world_bounds: PixelRect, target: &PixelRect) -> PixelRect {
    let side = (grid.tile_size() * LOCAL_WINDOW_TILES) as i32;
    let mut viewport = Viewport::new(side, side, world_bounds.width(), world_bounds.height());
    viewport.update(target)
}

fn candidate_rects(grid: &TileGrid, window: PixelRect) -> Vec<PixelRect> {
    grid.tiles_in_window_pixel(window)
        .iter()
        .map(|tile| tile.bounding_box())
        .collect()
}

/// Advances a gravity-driven body by one fixed simulation step.
pub(crate) fn resolve(
    body: &mut Body,
    profile: &MotionProfile,
    grid: &TileGrid,
    world_bounds: PixelRect,
) {
    // Horizontal integration.
    body.rect
        .translate(body.direction.signum() * profile.speed, 0);

    let window = local_window(grid, world_bounds, &body.rect);

    // Horizontal resolution: snap to the first overlapping candidate and
    // cancel the movement intent. No accumulation across further overlaps.
    if body.direction != HorizontalDir::Still {
        for tile in candidate_rects(grid, window) {
            if !body.rect.intersects(&tile) {
                continue;
            }
            if body.direction == HorizontalDir::Right {
                body.rect.set_right(tile.left());
            } else {
                body.rect.set_left(tile.right());
            }
            body.direction = HorizontalDir::Still;
            break;
        }
    }

    // Vertical integration under gravity, capped at terminal velocity. The
    // rect moves by the whole-pixel part of the velocity.
    if !body.grounded {
        body.y_velocity = (body.y_velocity + profile.gravity).min(profile.max_fall_speed);
        body.rect.translate(0, body.y_velocity as i32);
    }

    // Vertical resolution against a fresh query of the same window.
    if body.y_velocity != 0.0 {
        for tile in candidate_rects(grid, window) {
            if !body.rect.intersects(&tile) {
                continue;
            }
            if body.y_velocity > 0.0 {
                body.rect.set_bottom(tile.top());
                body.grounded = true;
            } else {
                body.rect.set_top(tile.bottom());
            }
            body.y_velocity = 0.0;
            break;
        }
    }

    // Ground probe: peek one pixel down to detect walking off a ledge. The
    // rect itself is left untouched; only the grounded flag changes.
    let probe = body.rect.translated(0, 1);
    body.grounded = candidate_rects(grid, window)
        .iter()
        .any(|tile| probe.intersects(tile));
}

/// Motion state of a projectile: straight-line integration along a fixed
/// angle, tracked in floating point so no distance is lost to rounding.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProjectileBody {
    x: f32,
    y: f32,
    angle: f32,
    speed: f32,
    pub(crate) rect: PixelRect,
}

impl ProjectileBody {
    pub(crate) fn launched(origin: PixelPoint, angle: f32, speed: f32, size: i32) -> Self {
        Self {
            x: origin.x as f32,
            y: origin.y as f32,
            angle,
            speed,
            rect: PixelRect::new(origin.x, origin.y, size, size),
        }
    }

    pub(crate) fn angle(&self) -> f32 {
        self.angle
    }

    pub(crate) fn speed(&self) -> f32 {
        self.speed
    }

    /// Integrates one step along the firing angle. Screen-space y grows
    /// downward, so a positive sine component moves the projectile up.
    pub(crate) fn advance(&mut self) {
        self.x += self.speed * self.angle.cos();
        self.y -= self.speed * self.angle.sin();
        self.rect.set_left(self.x.floor() as i32);
        self.rect.set_top(self.y.floor() as i32);
    }
}

/// Determines whether a projectile ends its flight this step.
///
/// Conditions are evaluated in a fixed order and the first qualifying one
/// wins: world bounds, then entities outside the exclusion list, then tiles
/// in the projectile's local window.
pub(crate) fn projectile_fate(
    rect: PixelRect,
    world_bounds: PixelRect,
    entities: &[(EntityId, PixelRect)],
    excluded: &[EntityId],
    grid: &TileGrid,
) -> Option<ProjectileFate> {
    if !rect.intersects(&world_bounds) {
        return Some(ProjectileFate::LeftWorld);
    }

    for (entity, target) in entities {
        if excluded.contains(entity) {
            continue;
        }
        if rect.intersects(target) {
            return Some(ProjectileFate::HitEntity { entity: *entity });
        }
    }

    let window = local_window(grid, world_bounds, &rect);
    if candidate_rects(grid, window)
        .iter()
        .any(|tile| rect.intersects(tile))
    {
        return Some(ProjectileFate::HitTile);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{projectile_fate, resolve, Body, MotionProfile, ProjectileBody};
    use crate::grid::{TileGrid, VisualHandle};
    use tilefall_core::{
        EntityId, HorizontalDir, PixelPoint, PixelRect, ProjectileFate, TileCoord, WorldConfig,
    };

    const WORLD: PixelRect = PixelRect::new(0, 0, 3200, 3200);

    fn profile() -> MotionProfile {
        MotionProfile::from_config(&WorldConfig::default())
    }

    fn grid_with_tiles(coords: &[(u32, u32)]) -> TileGrid {
        let mut grid = TileGrid::empty(100, 100, 32);
        for (x, y) in coords {
            grid.place(TileCoord::new(*x, *y), VisualHandle::ROCK);
        }
        grid
    }

    #[test]
    fn gravity_caps_velocity_at_terminal_speed() {
        let grid = grid_with_tiles(&[]);
        let mut body = Body::airborne(PixelRect::new(100, 0, 30, 32));

        for _ in 0..200 {
            resolve(&mut body, &profile(), &grid, WORLD);
        }

        assert!((body.y_velocity - 30.0).abs() < f32::EPSILON);
        assert!(!body.grounded);
    }

    #[test]
    fn moving_right_snaps_to_tile_edge_and_cancels_direction() {
        // Wall tile (4,5) spans pixels 128..160 on both axes.
        let grid = grid_with_tiles(&[(4, 5)]);
        let mut body = Body::airborne(PixelRect::new(97, 160, 30, 32));
        body.grounded = true;
        body.direction = HorizontalDir::Right;

        resolve(&mut body, &profile(), &grid, WORLD);

        assert_eq!(body.rect.right(), 128);
        assert_eq!(body.direction, HorizontalDir::Still);
    }

    #[test]
    fn moving_left_snaps_to_tile_edge_and_cancels_direction() {
        let grid = grid_with_tiles(&[(4, 5)]);
        let mut body = Body::airborne(PixelRect::new(162, 160, 30, 32));
        body.grounded = true;
        body.direction = HorizontalDir::Left;

        resolve(&mut body, &profile(), &grid, WORLD);

        assert_eq!(body.rect.left(), 160);
        assert_eq!(body.direction, HorizontalDir::Still);
    }

    #[test]
    fn falling_body_lands_on_floor_and_grounds() {
        // Floor row at y tile 6: top edge at pixel 192.
        let grid = grid_with_tiles(&[(2, 6), (3, 6), (4, 6), (5, 6)]);
        let mut body = Body::airborne(PixelRect::new(100, 100, 30, 32));

        for _ in 0..60 {
            resolve(&mut body, &profile(), &grid, WORLD);
        }

        assert_eq!(body.rect.bottom(), 192);
        assert!(body.grounded);
        assert_eq!(body.y_velocity, 0.0);
    }

    #[test]
    fn grounded_body_keeps_rect_after_probe() {
        let grid = grid_with_tiles(&[(4, 6)]);
        let mut body = Body::airborne(PixelRect::new(130, 160, 30, 32));
        body.grounded = true;

        resolve(&mut body, &profile(), &grid, WORLD);

        // The one-pixel probe shift is always restored.
        assert_eq!(body.rect, PixelRect::new(130, 160, 30, 32));
        assert!(body.grounded);
    }

    #[test]
    fn walking_off_a_ledge_transitions_to_airborne() {
        // Single platform tile (4,6); its surface spans x 128..160.
        let grid = grid_with_tiles(&[(4, 6)]);
        let mut body = Body::airborne(PixelRect::new(157, 160, 30, 32));
        body.grounded = true;
        body.direction = HorizontalDir::Right;

        resolve(&mut body, &profile(), &grid, WORLD);

        // One step further the footprint clears the platform entirely.
        assert_eq!(body.rect.left(), 160);
        assert!(!body.grounded);
        assert_eq!(body.rect.top(), 160);
    }

    #[test]
    fn rising_body_bumps_head_on_ceiling() {
        // Ceiling tile (4,4): bottom edge at pixel 160.
        let grid = grid_with_tiles(&[(4, 4)]);
        let mut body = Body::airborne(PixelRect::new(130, 162, 30, 32));
        body.y_velocity = -6.0;

        resolve(&mut body, &profile(), &grid, WORLD);

        assert_eq!(body.rect.top(), 160);
        assert_eq!(body.y_velocity, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn jump_requires_grounded_state() {
        let mut body = Body::airborne(PixelRect::new(0, 0, 30, 32));
        assert!(!body.jump(&profile()));

        body.grounded = true;
        assert!(body.jump(&profile()));
        assert!(!body.grounded);
        assert!((body.y_velocity + 6.0).abs() < f32::EPSILON);

        // No double jump while airborne.
        assert!(!body.jump(&profile()));
    }

    #[test]
    fn projectile_advances_along_fixed_angle() {
        let mut projectile =
            ProjectileBody::launched(PixelPoint::new(100, 100), 0.0, 10.0, 5);
        projectile.advance();
        assert_eq!(projectile.rect.left(), 110);
        assert_eq!(projectile.rect.top(), 100);

        let mut projectile = ProjectileBody::launched(
            PixelPoint::new(100, 100),
            std::f32::consts::FRAC_PI_2,
            10.0,
            5,
        );
        projectile.advance();
        assert_eq!(projectile.rect.top(), 90);
    }

    #[test]
    fn fate_prefers_world_bounds_over_everything() {
        let grid = grid_with_tiles(&[]);
        let fate = projectile_fate(
            PixelRect::new(-10, 50, 5, 5),
            WORLD,
            &[],
            &[],
            &grid,
        );
        assert_eq!(fate, Some(ProjectileFate::LeftWorld));
    }

    #[test]
    fn fate_prefers_entities_over_tiles() {
        let grid = grid_with_tiles(&[(4, 5)]);
        let target = EntityId::new(9);
        let rect = PixelRect::new(130, 170, 5, 5); // inside tile (4,5)

        let fate = projectile_fate(rect, WORLD, &[(target, rect)], &[], &grid);
        assert_eq!(fate, Some(ProjectileFate::HitEntity { entity: target }));
    }

    #[test]
    fn fate_skips_excluded_shooter() {
        let grid = grid_with_tiles(&[(4, 5)]);
        let shooter = EntityId::new(1);
        let rect = PixelRect::new(130, 170, 5, 5);

        let fate = projectile_fate(rect, WORLD, &[(shooter, rect)], &[shooter], &grid);
        assert_eq!(fate, Some(ProjectileFate::HitTile));
    }

    #[test]
    fn fate_is_none_in_open_air() {
        let grid = grid_with_tiles(&[(4, 5)]);
        let fate = projectile_fate(PixelRect::new(500, 500, 5, 5), WORLD, &[], &[], &grid);
        assert_eq!(fate, None);
    }
}
