//! The host interface the interpreter runs against.

use fanc_ir::{EnvId, GridPos, ObjectRef, TouchState, Value, ValueKind, VariableId};
use glam::{Quat, Vec3};

/// Address of one element of a variable's list storage.
///
/// Produced by variable and list-element blocks. `index` is unchecked:
/// negative or out-of-range elements read as the zero value of `kind`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pointer {
    pub var: VariableId,
    pub kind: ValueKind,
    pub index: i32,
}

impl Pointer {
    pub fn new(var: VariableId, kind: ValueKind) -> Self {
        Pointer {
            var,
            kind,
            index: 0,
        }
    }

    /// The element `offset` places further along.
    #[must_use]
    pub fn offset(self, offset: i32) -> Self {
        Pointer {
            index: self.index.saturating_add(offset),
            ..self
        }
    }
}

/// A collision reported by the host for a collision sensor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collision {
    pub other: ObjectRef,
    pub impulse: f32,
    pub normal: Vec3,
}

/// Result of a raycast query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastHit {
    pub hit: bool,
    pub position: Vec3,
    pub object: ObjectRef,
}

impl RaycastHit {
    pub const MISS: RaycastHit = RaycastHit {
        hit: false,
        position: Vec3::ZERO,
        object: ObjectRef::NONE,
    };
}

/// Everything a running program can observe or change outside itself.
///
/// Only variable storage is required. Every other callback defaults to a
/// host with no world: effects are dropped, sensors never fire and queries
/// return zero values. The interpreter calls these strictly in program
/// order and never reentrantly.
pub trait RuntimeContext {
    /// Current value of the element `pointer` addresses.
    fn get_value(&self, pointer: Pointer) -> Value;

    /// Store `value` at `pointer`. Negative indices are ignored.
    fn set_value(&mut self, pointer: Pointer, value: Value);

    fn win(&mut self, _delay: u8) {}

    fn lose(&mut self, _delay: u8) {}

    fn set_score(&mut self, _score: f32, _coins: f32, _ranking: u8) {}

    fn set_camera(&mut self, _position: Vec3, _rotation: Quat, _range: f32, _perspective: bool) {}

    fn set_light(&mut self, _position: Vec3, _rotation: Quat) {}

    fn set_gravity(&mut self, _gravity: Vec3) {}

    fn set_position(&mut self, _object: ObjectRef, _position: Vec3, _rotation: Quat) {}

    fn set_visible(&mut self, _object: ObjectRef, _visible: bool) {}

    /// Copy `original`, returning the new object.
    fn create_object(&mut self, _original: ObjectRef) -> ObjectRef {
        ObjectRef::NONE
    }

    fn destroy_object(&mut self, _object: ObjectRef) {}

    /// Start a sound, returning the channel it plays on (`-1` for none).
    fn play_sound(&mut self, _volume: f32, _pitch: f32, _sound: u8, _looping: bool) -> f32 {
        -1.0
    }

    fn stop_sound(&mut self, _channel: f32) {}

    fn add_force(&mut self, _object: ObjectRef, _force: Vec3, _applied_at: Vec3, _torque: Vec3) {}

    fn set_velocity(&mut self, _object: ObjectRef, _velocity: Vec3, _spin: Vec3) {}

    /// Screen coordinates of `finger` when it is in touch phase `state`.
    fn touch(&mut self, _state: TouchState, _finger: u8) -> Option<(f32, f32)> {
        None
    }

    /// Direction of a swipe completed this frame.
    fn swipe(&mut self) -> Option<Vec3> {
        None
    }

    /// Whether on-screen button `kind` was pressed this frame.
    fn button(&mut self, _kind: u8) -> bool {
        false
    }

    /// A collision `object` took part in this frame.
    fn collision(&mut self, _object: ObjectRef) -> Option<Collision> {
        None
    }

    fn random_seed(&mut self, _seed: f32) {}

    /// A random number in `[min, max)`.
    fn random(&mut self, min: f32, _max: f32) -> f32 {
        min
    }

    fn screen_size(&self) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn object_position(&self, _object: ObjectRef) -> (Vec3, Quat) {
        (Vec3::ZERO, Quat::IDENTITY)
    }

    /// Linear and angular velocity of `object`.
    fn object_velocity(&self, _object: ObjectRef) -> (Vec3, Vec3) {
        (Vec3::ZERO, Vec3::ZERO)
    }

    fn raycast(&mut self, _from: Vec3, _to: Vec3) -> RaycastHit {
        RaycastHit::MISS
    }

    /// Debug probe: an inspect block at `pos` in environment `env` saw
    /// `value`.
    fn inspect(&mut self, _value: Value, _env: EnvId, _pos: GridPos) {}
}
