#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure tool system translating cursor actions into world edit commands.

use tilefall_core::{Command, EntityId, PixelPoint};

/// Distance a fired projectile travels per fixed step, in pixels.
pub const PROJECTILE_SPEED: f32 = 10.0;

/// Tools the player can equip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Places and removes solid tiles under the cursor.
    TileTool,
    /// Spawns additional characters at the cursor.
    SpawnerTool,
    /// Fires projectiles from the wielder toward the cursor.
    Weapon,
}

/// Input snapshot distilled from adapter-provided frame input data.
///
/// The cursor location must already be translated from window space into
/// world pixels; the system never sees the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolInput {
    /// Indicates whether the primary action was pressed on this frame.
    pub primary: bool,
    /// Indicates whether the secondary action was pressed on this frame.
    pub secondary: bool,
    /// Cursor location in world pixels, if the cursor is inside the window.
    pub cursor_world: Option<PixelPoint>,
    /// Tool the player switched to on this frame, if any.
    pub select: Option<ToolKind>,
}

impl ToolInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        primary: bool,
        secondary: bool,
        cursor_world: Option<PixelPoint>,
        select: Option<ToolKind>,
    ) -> Self {
        Self {
            primary,
            secondary,
            cursor_world,
            select,
        }
    }
}

impl Default for ToolInput {
    fn default() -> Self {
        Self {
            primary: false,
            secondary: false,
            cursor_world: None,
            select: None,
        }
    }
}

/// Character wielding the weapon and the world-pixel center it fires from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WielderAnchor {
    /// Entity credited as the shooter and excluded from projectile hits.
    pub entity: EntityId,
    /// Center of the wielder's bounding box in world pixels.
    pub center: PixelPoint,
}

impl WielderAnchor {
    /// Creates a new anchor descriptor.
    #[must_use]
    pub const fn new(entity: EntityId, center: PixelPoint) -> Self {
        Self { entity, center }
    }
}

/// Tool system that applies the equipped tool's action at the cursor.
#[derive(Debug, Clone)]
pub struct Tools {
    active: ToolKind,
}

impl Default for Tools {
    fn default() -> Self {
        Self::new()
    }
}

impl Tools {
    /// Creates a tool system with the tile tool equipped.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: ToolKind::TileTool,
        }
    }

    /// Tool currently equipped.
    #[must_use]
    pub const fn active(&self) -> ToolKind {
        self.active
    }

    /// Consumes adapter-derived input to emit edit, spawn, and fire commands.
    ///
    /// The `solid_at` closure should mirror the semantics of the world's
    /// `query::solid_tile_at` helper: the tile tool only places into empty
    /// cells and only removes existing tiles, so no-op edits never reach the
    /// world.
    pub fn handle<F>(
        &mut self,
        input: ToolInput,
        wielder: Option<WielderAnchor>,
        mut solid_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(PixelPoint) -> bool,
    {
        if let Some(kind) = input.select {
            self.active = kind;
        }

        let Some(cursor) = input.cursor_world else {
            return;
        };

        match self.active {
            ToolKind::TileTool => {
                if input.primary && !solid_at(cursor) {
                    out.push(Command::PlaceTile { pixel: cursor });
                }
                if input.secondary && solid_at(cursor) {
                    out.push(Command::RemoveTile { pixel: cursor });
                }
            }
            ToolKind::SpawnerTool => {
                if input.primary {
                    out.push(Command::SpawnCharacter { pixel: cursor });
                }
            }
            ToolKind::Weapon => {
                if input.primary {
                    if let Some(anchor) = wielder {
                        out.push(Command::FireProjectile {
                            origin: anchor.center,
                            angle: aim_angle(anchor.center, cursor),
                            speed: PROJECTILE_SPEED,
                            shooter: anchor.entity,
                        });
                    }
                }
            }
        }
    }
}

/// Firing angle from the wielder toward the cursor.
///
/// Radians, measured counter-clockwise from the positive x axis with the
/// screen's y axis pointing down, matching the projectile integrator.
fn aim_angle(source: PixelPoint, target: PixelPoint) -> f32 {
    let run = (target.x - source.x) as f32;
    let rise = (source.y - target.y) as f32;
    rise.atan2(run)
}
