use std::collections::BTreeMap;

use sceneconfig::{UniformKind, UniformValue};

/// Uniform slots owned by one material.
///
/// Slots are declared while the scene is built; afterwards the driver only
/// overwrites existing slots with values of the same kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformStore {
    slots: BTreeMap<String, UniformValue>,
}

impl UniformStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, value: UniformValue) {
        self.slots.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.slots.get(name).copied()
    }

    pub fn kind(&self, name: &str) -> Option<UniformKind> {
        self.slots.get(name).map(UniformValue::kind)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.slots.get(name) {
            Some(UniformValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn vec2(&self, name: &str) -> Option<[f32; 2]> {
        match self.slots.get(name) {
            Some(UniformValue::Vec2(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<[f32; 3]> {
        match self.slots.get(name) {
            Some(UniformValue::Vec3(value)) => Some(*value),
            _ => None,
        }
    }

    /// Writes into an existing slot. Returns `false` when the slot is missing
    /// or declared with a different kind; the store is left untouched then.
    pub fn write(&mut self, name: &str, value: UniformValue) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) if slot.kind() == value.kind() => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.slots.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<(String, UniformValue)> for UniformStore {
    fn from_iter<I: IntoIterator<Item = (String, UniformValue)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_declared_slot() {
        let mut store = UniformStore::new();
        assert!(!store.write("time", UniformValue::Float(1.0)));
        assert!(store.is_empty());
    }

    #[test]
    fn write_requires_matching_kind() {
        let mut store = UniformStore::new();
        store.declare("resolution", UniformValue::Vec2([800.0, 600.0]));
        assert!(!store.write("resolution", UniformValue::Float(1.0)));
        assert_eq!(store.vec2("resolution"), Some([800.0, 600.0]));
        assert!(store.write("resolution", UniformValue::Vec2([1024.0, 768.0])));
        assert_eq!(store.vec2("resolution"), Some([1024.0, 768.0]));
    }

    #[test]
    fn typed_accessors_ignore_other_kinds() {
        let mut store = UniformStore::new();
        store.declare("time", UniformValue::Float(0.5));
        assert_eq!(store.float("time"), Some(0.5));
        assert_eq!(store.vec3("time"), None);
        assert_eq!(store.kind("time"), Some(UniformKind::Float));
    }
}
