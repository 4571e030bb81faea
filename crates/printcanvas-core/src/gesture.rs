//! Gesture state machine for pointer and multi-touch input.
//!
//! The engine is pure: it consumes raw [`PointerEvent`]s and produces
//! [`GestureAction`]s. The editor applies those actions to the scene, so the
//! object model stays the only writer.
//!
//! ```text
//!        down              second touch
//! Idle --------> Dragging ---------------> Gesturing
//!  ^                |  ^                      |
//!  |   last up      |  |   one finger lifted  |
//!  +----------------+  +----------------------+
//! ```

use crate::objects::ObjectId;
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Identifier of a pointer or touch contact as reported by the host.
pub type PointerId = u64;

/// Raw input, in screen coordinates relative to the canvas element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { id: PointerId, position: Point },
    Move { id: PointerId, position: Point },
    Up { id: PointerId, position: Point },
    Cancel { id: PointerId },
    Wheel { position: Point, delta_y: f64 },
}

/// Interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GesturePhase {
    #[default]
    Idle,
    /// One contact: moves the selected object or pans.
    Dragging,
    /// Two or more contacts: pinch zoom and twist rotate.
    Gesturing,
}

/// Operation requested by the gesture engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// First contact landed at a screen position.
    Pressed { position: Point },
    /// Move an object by a canvas-space delta.
    MoveObject { id: ObjectId, delta: Vec2 },
    /// Pan the viewport by a screen-space delta.
    Pan { delta: Vec2 },
    /// Multiply zoom, keeping a screen point fixed.
    Zoom { factor: f64, center: Point },
    /// Rotate an object by degrees.
    Rotate { id: ObjectId, degrees: f64 },
    /// Last contact lifted.
    Released,
}

/// Ephemeral gesture tracking, cleared whenever no contacts remain.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    pub phase: GesturePhase,
    /// Distance between the two tracked touches at the last accepted frame.
    pub baseline_distance: f64,
    /// Angle (radians) of the vector between the two touches.
    pub baseline_angle: f64,
    pub baseline_center: Point,
    /// Previous single-pointer position.
    pub last_position: Option<Point>,
}

/// Behavior switches derived from the device profile and config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Track additional contacts for pinch/rotate.
    pub multi_touch: bool,
    pub min_gesture_distance: f64,
    pub wheel_zoom_base: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            multi_touch: false,
            min_gesture_distance: 1.0,
            wheel_zoom_base: 0.999,
        }
    }
}

/// Two-contact geometry for a single frame.
#[derive(Debug, Clone, Copy)]
struct PinchFrame {
    distance: f64,
    angle: f64,
    center: Point,
}

impl PinchFrame {
    fn new(a: Point, b: Point) -> Self {
        let v = b - a;
        Self {
            distance: v.hypot(),
            angle: v.y.atan2(v.x),
            center: a.midpoint(b),
        }
    }

    fn is_valid(&self, min_distance: f64) -> bool {
        self.distance.is_finite()
            && self.angle.is_finite()
            && self.center.x.is_finite()
            && self.center.y.is_finite()
            && self.distance >= min_distance
    }
}

/// Normalize an angle difference in degrees into (-180, 180].
pub fn normalize_angle_delta(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Interprets pointer/touch input.
#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    config: GestureConfig,
    state: GestureState,
    /// Active contacts in arrival order.
    contacts: Vec<(PointerId, Point)>,
}

impl GestureEngine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
            contacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Swap configuration (e.g. after a device variant change). Clears state.
    pub fn reconfigure(&mut self, config: GestureConfig) {
        self.config = config;
        self.reset();
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn phase(&self) -> GesturePhase {
        self.state.phase
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Drop all contacts and return to Idle.
    pub fn reset(&mut self) {
        self.contacts.clear();
        self.state = GestureState::default();
    }

    /// Process one input event.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        selected: Option<ObjectId>,
        viewport: &Viewport,
    ) -> Vec<GestureAction> {
        match event {
            PointerEvent::Down { id, position } => self.on_down(id, position),
            PointerEvent::Move { id, position } => self.on_move(id, position, selected, viewport),
            PointerEvent::Up { id, .. } | PointerEvent::Cancel { id } => self.on_up(id),
            PointerEvent::Wheel { position, delta_y } => self.on_wheel(position, delta_y),
        }
    }

    fn on_down(&mut self, id: PointerId, position: Point) -> Vec<GestureAction> {
        if let Some(contact) = self.contacts.iter_mut().find(|(cid, _)| *cid == id) {
            contact.1 = position;
            return Vec::new();
        }

        if self.contacts.is_empty() {
            self.contacts.push((id, position));
            self.state.phase = GesturePhase::Dragging;
            self.state.last_position = Some(position);
            return vec![GestureAction::Pressed { position }];
        }

        if !self.config.multi_touch {
            log::trace!("Ignoring extra pointer {} in pointer-only mode", id);
            return Vec::new();
        }

        self.contacts.push((id, position));
        if self.contacts.len() == 2 {
            self.state.phase = GesturePhase::Gesturing;
            self.state.last_position = None;
            self.seed_baseline();
        }
        Vec::new()
    }

    fn on_move(
        &mut self,
        id: PointerId,
        position: Point,
        selected: Option<ObjectId>,
        viewport: &Viewport,
    ) -> Vec<GestureAction> {
        let Some(index) = self.contacts.iter().position(|(cid, _)| *cid == id) else {
            return Vec::new();
        };
        self.contacts[index].1 = position;

        match self.state.phase {
            GesturePhase::Idle => Vec::new(),
            GesturePhase::Dragging => self.drag_frame(position, selected, viewport),
            // Third and later contacts do not drive geometry
            GesturePhase::Gesturing if index < 2 => self.pinch_frame(selected),
            GesturePhase::Gesturing => Vec::new(),
        }
    }

    fn drag_frame(
        &mut self,
        position: Point,
        selected: Option<ObjectId>,
        viewport: &Viewport,
    ) -> Vec<GestureAction> {
        let previous = self.state.last_position.replace(position);
        let Some(previous) = previous else {
            return Vec::new();
        };
        let delta = position - previous;
        if !(delta.x.is_finite() && delta.y.is_finite()) || delta == Vec2::ZERO {
            return Vec::new();
        }

        match selected {
            Some(id) => {
                let delta = viewport.screen_delta_to_canvas(delta);
                if !(delta.x.is_finite() && delta.y.is_finite()) {
                    return Vec::new();
                }
                vec![GestureAction::MoveObject { id, delta }]
            }
            None => vec![GestureAction::Pan { delta }],
        }
    }

    fn pinch_frame(&mut self, selected: Option<ObjectId>) -> Vec<GestureAction> {
        let frame = PinchFrame::new(self.contacts[0].1, self.contacts[1].1);
        let min_distance = self.config.min_gesture_distance;
        if !frame.is_valid(min_distance) {
            log::trace!("Discarding degenerate pinch frame");
            return Vec::new();
        }

        let baseline_ok =
            self.state.baseline_distance.is_finite() && self.state.baseline_distance >= min_distance;
        if !baseline_ok {
            self.set_baseline(frame);
            return Vec::new();
        }

        let factor = frame.distance / self.state.baseline_distance;
        let degrees = normalize_angle_delta((frame.angle - self.state.baseline_angle).to_degrees());
        if !(factor.is_finite() && degrees.is_finite()) {
            return Vec::new();
        }
        self.set_baseline(frame);

        let mut actions = Vec::with_capacity(2);
        if (factor - 1.0).abs() > f64::EPSILON {
            actions.push(GestureAction::Zoom {
                factor,
                center: frame.center,
            });
        }
        // Rotation without a selection is dropped
        if let Some(id) = selected {
            if degrees.abs() > f64::EPSILON {
                actions.push(GestureAction::Rotate { id, degrees });
            }
        }
        actions
    }

    fn on_up(&mut self, id: PointerId) -> Vec<GestureAction> {
        let Some(index) = self.contacts.iter().position(|(cid, _)| *cid == id) else {
            return Vec::new();
        };
        self.contacts.remove(index);

        match self.contacts.len() {
            0 => {
                self.state = GestureState::default();
                vec![GestureAction::Released]
            }
            1 => {
                let remaining = self.contacts[0].1;
                self.state = GestureState {
                    phase: GesturePhase::Dragging,
                    last_position: Some(remaining),
                    ..GestureState::default()
                };
                Vec::new()
            }
            _ => {
                if index < 2 {
                    self.seed_baseline();
                }
                Vec::new()
            }
        }
    }

    fn on_wheel(&mut self, position: Point, delta_y: f64) -> Vec<GestureAction> {
        if self.config.multi_touch {
            return Vec::new();
        }
        let factor = self.config.wheel_zoom_base.powf(delta_y);
        if !factor.is_finite() || factor <= 0.0 || (factor - 1.0).abs() < f64::EPSILON {
            return Vec::new();
        }
        vec![GestureAction::Zoom {
            factor,
            center: position,
        }]
    }

    fn seed_baseline(&mut self) {
        if self.contacts.len() >= 2 {
            self.set_baseline(PinchFrame::new(self.contacts[0].1, self.contacts[1].1));
        }
    }

    fn set_baseline(&mut self, frame: PinchFrame) {
        self.state.baseline_distance = frame.distance;
        self.state.baseline_angle = frame.angle;
        self.state.baseline_center = frame.center;
    }
}
