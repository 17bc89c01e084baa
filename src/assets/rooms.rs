//! Room payload post-processing.

use serde_json::{Map, Value};

use crate::assets::policy::AssetPolicy;

const IMAGE_URL: &str = "imageUrl";
const IMAGES: &str = "images";
const ROOMS: &str = "rooms";

impl AssetPolicy {
    /// Rewrite image references in a room payload, returning how many were
    /// substituted.
    ///
    /// Accepts a single room, an array of rooms, or a page object holding a
    /// `rooms` array. Every entry of a `rooms` array is a room; anywhere else an
    /// object only counts as a room if it carries `imageUrl` or `images`, so
    /// sub-resources like availability or acknowledgements pass untouched.
    /// Every room leaves with a renderable `imageUrl`, and an `images` key,
    /// when present, always holds at least one entry.
    pub fn normalize_rooms(&self, data: &mut Value) -> usize {
        if let Some(Value::Array(rooms)) = data.get_mut(ROOMS) {
            return rooms
                .iter_mut()
                .filter_map(Value::as_object_mut)
                .map(|room| self.normalize_room(room))
                .sum();
        }

        match data {
            Value::Array(items) => items.iter_mut().map(|item| self.normalize_rooms(item)).sum(),
            Value::Object(room) if carries_images(room) => self.normalize_room(room),
            _ => 0,
        }
    }

    fn normalize_room(&self, room: &mut Map<String, Value>) -> usize {
        let mut substituted = 0;

        let keep = room
            .get(IMAGE_URL)
            .and_then(Value::as_str)
            .is_some_and(|r| self.is_renderable(r));
        if !keep {
            room.insert(IMAGE_URL.to_string(), Value::String(self.fallback().to_string()));
            substituted += 1;
        }

        if let Some(images) = room.get_mut(IMAGES) {
            let mut resolved = Vec::new();
            if let Value::Array(items) = images {
                for item in items.iter() {
                    match item.as_str() {
                        Some(r) if self.is_renderable(r) => resolved.push(item.clone()),
                        _ => {
                            resolved.push(Value::String(self.fallback().to_string()));
                            substituted += 1;
                        }
                    }
                }
            }
            if resolved.is_empty() {
                resolved.push(Value::String(self.fallback().to_string()));
                substituted += 1;
            }
            *images = Value::Array(resolved);
        }

        substituted
    }
}

fn carries_images(object: &Map<String, Value>) -> bool {
    object.contains_key(IMAGE_URL) || object.contains_key(IMAGES)
}
