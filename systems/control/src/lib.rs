#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure control system that turns held movement keys into world commands.

use tilefall_core::{Command, EntityId, Event, HorizontalDir};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlInput {
    /// Indicates whether the left movement key is held on this frame.
    pub move_left: bool,
    /// Indicates whether the right movement key is held on this frame.
    pub move_right: bool,
    /// Indicates whether the player pressed jump on this frame.
    pub jump: bool,
}

impl ControlInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(move_left: bool, move_right: bool, jump: bool) -> Self {
        Self {
            move_left,
            move_right,
            jump,
        }
    }
}

impl Default for ControlInput {
    fn default() -> Self {
        Self {
            move_left: false,
            move_right: false,
            jump: false,
        }
    }
}

/// Control system that steers one subject character.
///
/// Direction commands are emitted only when the held keys change, mirroring
/// key-down/key-up input: once the world cancels a walk by snapping against a
/// tile, the system stays silent until the player changes keys.
#[derive(Debug, Clone)]
pub struct Control {
    subject: Option<EntityId>,
    last_direction: HorizontalDir,
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

impl Control {
    /// Creates a control system with no subject attached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subject: None,
            last_direction: HorizontalDir::Still,
        }
    }

    /// Attaches the system to the given character, replacing any previous
    /// subject.
    pub fn attach(&mut self, entity: EntityId) {
        self.subject = Some(entity);
        self.last_direction = HorizontalDir::Still;
    }

    /// Character currently steered by this system, if any.
    #[must_use]
    pub const fn subject(&self) -> Option<EntityId> {
        self.subject
    }

    /// Consumes world events and adapter-derived input to emit steering
    /// commands.
    ///
    /// The first spawned character is adopted as the subject automatically,
    /// so adapters spawning a single player need no explicit [`Self::attach`].
    pub fn handle(&mut self, events: &[Event], input: ControlInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::CharacterSpawned { entity, .. } = event {
                if self.subject.is_none() {
                    self.subject = Some(*entity);
                }
            }
        }

        let Some(entity) = self.subject else {
            return;
        };

        let direction = match (input.move_left, input.move_right) {
            (true, false) => HorizontalDir::Left,
            (false, true) => HorizontalDir::Right,
            // Both held cancels out, as does neither.
            _ => HorizontalDir::Still,
        };

        if direction != self.last_direction {
            self.last_direction = direction;
            out.push(Command::SetDirection { entity, direction });
        }

        if input.jump {
            out.push(Command::Jump { entity });
        }
    }
}
