#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tilefall adapters.
//!
//! The simulation core never draws. Adapters assemble a [`Scene`] from world
//! queries each frame and hand it to a [`FramePresenter`]. The tile layer is
//! not flattened into sprites: backends keep one pre-rendered world surface,
//! repaint it only when [`Scene::tile_layer_revision`] changes, and crop it to
//! [`Scene::window`] when compositing.

use anyhow::Result as AnyResult;
use glam::Vec2;
use tilefall_core::{EntityId, PixelRect};
use std::{error::Error, fmt};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the left movement key is held on this frame.
    pub move_left: bool,
    /// Whether the right movement key is held on this frame.
    pub move_right: bool,
    /// Whether the jump key was pressed on this frame.
    pub jump: bool,
    /// Whether the primary tool action was pressed on this frame.
    pub primary_action: bool,
    /// Whether the secondary tool action was pressed on this frame.
    pub secondary_action: bool,
    /// Cursor position in window pixels, if the cursor is inside the window.
    pub cursor_window_space: Option<Vec2>,
    /// One-based tool slot the player selected on this frame, if any.
    pub tool_slot: Option<u8>,
}

/// Compositing order of a sprite within the frame.
///
/// Sprites draw back to front: the cleared background first, then the cropped
/// tile surface, then entities, then overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Flat clear color behind everything.
    Background,
    /// Cached world tile surface cropped to the window.
    Tiles,
    /// Characters and projectiles.
    Entities,
    /// Markers drawn on top of everything, such as surface highlights.
    Overlay,
}

/// Single rectangle to composite, already translated into window space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteInstance {
    /// Draw rect relative to the window's top-left corner.
    pub rect: PixelRect,
    /// Layer the sprite composites into.
    pub layer: Layer,
    /// Fill color for backends without textures.
    pub color: Color,
    /// Entity the sprite depicts, if it depicts one.
    pub entity: Option<EntityId>,
}

impl SpriteInstance {
    /// Creates a new sprite descriptor.
    #[must_use]
    pub const fn new(rect: PixelRect, layer: Layer, color: Color, entity: Option<EntityId>) -> Self {
        Self {
            rect,
            layer,
            color,
            entity,
        }
    }
}

/// Complete description of one presentable frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// World-pixel rect to crop the cached tile surface to.
    pub window: PixelRect,
    /// Clear color behind the tile surface.
    pub background: Color,
    /// Revision of the world's tile layer; backends repaint their cached
    /// surface only when this value changes.
    pub tile_layer_revision: u64,
    /// Sprites to composite over the tile surface.
    pub sprites: Vec<SpriteInstance>,
}

impl Scene {
    /// Creates a scene with no sprites.
    ///
    /// Rejects empty windows; a backend cannot crop to a zero-sized rect.
    pub fn new(
        window: PixelRect,
        background: Color,
        tile_layer_revision: u64,
    ) -> Result<Self, RenderingError> {
        if window.width() <= 0 || window.height() <= 0 {
            return Err(RenderingError::EmptyWindow {
                width: window.width(),
                height: window.height(),
            });
        }
        Ok(Self {
            window,
            background,
            tile_layer_revision,
            sprites: Vec::new(),
        })
    }

    /// Adds a sprite to the scene.
    pub fn push(&mut self, sprite: SpriteInstance) {
        self.sprites.push(sprite);
    }

    /// Orders the sprites back to front.
    ///
    /// The sort is stable, so sprites within a layer keep their insertion
    /// order and adapters control draw order inside each layer.
    pub fn sort_by_layer(&mut self) {
        self.sprites.sort_by_key(|sprite| sprite.layer);
    }
}

/// Presenter capable of displaying assembled Tilefall scenes.
pub trait FramePresenter {
    /// Presents one scene, blocking until the frame is submitted.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Scene windows must have a positive area.
    EmptyWindow {
        /// Window width that failed validation.
        width: i32,
        /// Window height that failed validation.
        height: i32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWindow { width, height } => {
                write!(f, "scene window must have a positive area (received {width}x{height})")
            }
        }
    }
}

impl Error for RenderingError {}
