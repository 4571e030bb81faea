//! Scene graph: the print-area canvas and its design objects.

use crate::objects::{DesignObject, ObjectId, SerializableColor};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A snapshot of scene content for undo/redo.
///
/// Objects are stored back to front. The viewport is a view concern and is
/// never captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub background: SerializableColor,
    pub objects: Vec<DesignObject>,
}

/// The print-area canvas: background, viewport and an object arena.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Canvas width in print-area pixels.
    pub width: f64,
    /// Canvas height in print-area pixels.
    pub height: f64,
    pub background: SerializableColor,
    pub viewport: Viewport,
    /// All objects, keyed by ID.
    objects: HashMap<ObjectId, DesignObject>,
    /// Z-order of objects (back to front).
    z_order: Vec<ObjectId>,
}

impl Scene {
    /// Create an empty scene with a white background.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: SerializableColor::white(),
            viewport: Viewport::default(),
            objects: HashMap::new(),
            z_order: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Append an object at the front. Returns false (and drops the object)
    /// when its id is already present.
    pub fn insert(&mut self, object: DesignObject) -> bool {
        let id = object.id();
        if self.objects.contains_key(&id) {
            log::warn!("Object {} already exists in scene, skipping", id);
            return false;
        }
        self.z_order.push(id);
        self.objects.insert(id, object);
        true
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<DesignObject> {
        self.z_order.retain(|&object_id| object_id != id);
        self.objects.remove(&id)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
    }

    pub fn get(&self, id: ObjectId) -> Option<&DesignObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DesignObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Objects in z-order (back to front).
    pub fn objects(&self) -> impl DoubleEndedIterator<Item = &DesignObject> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    pub fn z_order(&self) -> &[ObjectId] {
        &self.z_order
    }

    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    /// Front-most visible object under a canvas point.
    pub fn object_at(&self, point: Point) -> Option<ObjectId> {
        self.objects()
            .rev()
            .find(|object| object.is_visible() && object.hit_test(point))
            .map(DesignObject::id)
    }

    /// Move an object by a canvas-space delta.
    pub fn translate_object(&mut self, id: ObjectId, delta: Vec2) -> bool {
        if !(delta.x.is_finite() && delta.y.is_finite()) {
            return false;
        }
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.translate(delta);
                true
            }
            None => false,
        }
    }

    /// Rotate an object by a number of degrees.
    pub fn rotate_object(&mut self, id: ObjectId, degrees: f64) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.rotate_by(degrees);
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) if object.base().visible != visible => {
                object.base_mut().visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Bring an object to the front (topmost).
    /// Returns true if the z-order changed.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.z_order.len() => {
                self.z_order.remove(pos);
                self.z_order.push(id);
                true
            }
            _ => false,
        }
    }

    /// Send an object to the back (bottommost).
    /// Returns true if the z-order changed.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => {
                self.z_order.remove(pos);
                self.z_order.insert(0, id);
                true
            }
            _ => false,
        }
    }

    /// Move an object one layer forward (towards front).
    /// Returns true if the object was moved, false if already at front.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.z_order.len() => {
                self.z_order.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Move an object one layer backward (towards back).
    /// Returns true if the object was moved, false if already at back.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => {
                self.z_order.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.z_order.iter().position(|&object_id| object_id == id)
    }

    /// Capture background and objects for history.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            background: self.background,
            objects: self.objects().cloned().collect(),
        }
    }

    /// Replace background and objects from a snapshot. The viewport is kept.
    pub fn restore(&mut self, snapshot: SceneSnapshot) {
        self.background = snapshot.background;
        self.clear();
        for object in snapshot.objects {
            self.insert(object);
        }
    }
}
