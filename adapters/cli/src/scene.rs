//! Builds rendering scenes from world query snapshots.

use anyhow::Result as AnyResult;
use tilefall_core::TileWindow;
use tilefall_rendering::{Color, Layer, Scene, SpriteInstance};
use tilefall_world::{query, TileGrid, Viewport, World};

/// Clear color behind the tile surface.
const SKY: Color = Color::from_rgb_u8(0, 0, 255);
/// Fill color for character sprites.
const CHARACTER: Color = Color::from_rgb_u8(255, 0, 0);
/// Fill color for projectile sprites.
const PROJECTILE: Color = Color::from_rgb_u8(255, 255, 255);
/// Highlight drawn over tiles exposed to air.
const SURFACE: Color = Color::from_rgb_u8(0, 255, 0);

/// Assembles the frame's scene: the cropped tile surface, every entity in
/// view space, and a surface highlight overlay.
pub(crate) fn compose(world: &World) -> AnyResult<Scene> {
    let viewport = query::viewport(world);
    let grid = query::tile_grid(world);

    let mut scene = Scene::new(viewport.window(), SKY, grid.layer().revision())?;

    for character in query::character_view(world).iter() {
        scene.push(SpriteInstance::new(
            viewport.apply(character),
            Layer::Entities,
            CHARACTER,
            Some(character.id),
        ));
    }
    for projectile in query::projectile_view(world).iter() {
        scene.push(SpriteInstance::new(
            viewport.apply(projectile),
            Layer::Entities,
            PROJECTILE,
            Some(projectile.id),
        ));
    }

    if let Some(window) = visible_tile_window(grid, viewport) {
        for tile in grid.surface_tiles(window) {
            scene.push(SpriteInstance::new(
                viewport.apply(tile),
                Layer::Overlay,
                SURFACE,
                None,
            ));
        }
    }

    scene.sort_by_layer();
    Ok(scene)
}

/// Half-open range of grid cells the viewport currently exposes.
///
/// The viewport window never scrolls to negative coordinates, so only the far
/// edges need clamping against the grid extents.
fn visible_tile_window(grid: &TileGrid, viewport: &Viewport) -> Option<TileWindow> {
    let window = viewport.window();
    let size = grid.tile_size() as i32;

    let first_column = (window.left() / size) as u32;
    let first_row = (window.top() / size) as u32;
    let end_column = (((window.right() + size - 1) / size) as u32).min(grid.columns());
    let end_row = (((window.bottom() + size - 1) / size) as u32).min(grid.rows());
    if first_column >= end_column || first_row >= end_row {
        return None;
    }

    Some(TileWindow::new(
        first_column,
        first_row,
        end_column - first_column,
        end_row - first_row,
    ))
}

#[cfg(test)]
mod tests {
    use super::{compose, visible_tile_window, CHARACTER, SURFACE};
    use tilefall_core::{Command, PixelPoint, PixelRect, WorldConfig};
    use tilefall_rendering::Layer;
    use tilefall_world::{self as world, query, World};

    fn config() -> WorldConfig {
        WorldConfig {
            grid_columns: 20,
            grid_rows: 20,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn compose_projects_characters_into_window_space() {
        let mut world = World::with_empty_grid(config());
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::SpawnCharacter {
                pixel: PixelPoint::new(100, 100),
            },
            &mut events,
        );

        let scene = compose(&world).expect("scene composes");

        let entities: Vec<_> = scene
            .sprites
            .iter()
            .filter(|sprite| sprite.layer == Layer::Entities)
            .collect();
        assert_eq!(entities.len(), 1);
        // The viewport has not moved, so world space equals window space.
        assert_eq!(entities[0].rect, PixelRect::new(100, 100, 30, 32));
        assert_eq!(entities[0].color, CHARACTER);
    }

    #[test]
    fn compose_highlights_surface_tiles_in_view() {
        let mut world = World::with_empty_grid(config());
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::PlaceTile {
                pixel: PixelPoint::new(100, 100),
            },
            &mut events,
        );

        let scene = compose(&world).expect("scene composes");

        let overlays: Vec<_> = scene
            .sprites
            .iter()
            .filter(|sprite| sprite.layer == Layer::Overlay)
            .collect();
        assert_eq!(overlays.len(), 1, "a lone tile is all surface");
        assert_eq!(overlays[0].rect, PixelRect::new(96, 96, 32, 32));
        assert_eq!(overlays[0].color, SURFACE);
    }

    #[test]
    fn visible_window_is_clamped_to_the_grid() {
        let world = World::with_empty_grid(config());
        let window = visible_tile_window(query::tile_grid(&world), query::viewport(&world))
            .expect("grid is visible");

        // A 1024x768 window over a 20x20 grid exposes the whole grid.
        assert_eq!(window.left(), 0);
        assert_eq!(window.top(), 0);
        assert_eq!(window.width(), 20);
        assert_eq!(window.height(), 20);
    }

    #[test]
    fn scene_revision_tracks_tile_edits() {
        let mut world = World::with_empty_grid(config());
        let mut events = Vec::new();
        let before = compose(&world).expect("scene composes").tile_layer_revision;

        world::apply(
            &mut world,
            Command::PlaceTile {
                pixel: PixelPoint::new(100, 100),
            },
            &mut events,
        );
        let after = compose(&world).expect("scene composes").tile_layer_revision;

        assert_ne!(before, after, "tile edits must invalidate cached surfaces");
    }
}
