//! Keyed, insertion-ordered resource registries
//!
//! Uploaded GPU objects and scene entities are looked up by name, but a few
//! well-known resources (placeholder textures, the default sampler, the
//! depth buffer) exist regardless of scene content. Merging those sentinels
//! into the key type as a closed enum keeps them from colliding with
//! scene-chosen names.

use std::collections::HashMap;
use std::fmt;

/// Reserved registry slots that always exist after renderer init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedKey {
    /// 1x1 white color texture bound when a slot needs a texture but no
    /// scene texture applies.
    PlaceholderTexture,
    /// 1x1 depth texture bound to unused shadow-map slots.
    PlaceholderDepth,
    DefaultSampler,
    /// Comparison sampler shared by every shadow-map slot.
    ShadowSampler,
    DepthBuffer,
    /// Ambient irradiance cube sampled by the main and background passes.
    IrradianceMap,
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReservedKey::PlaceholderTexture => "<placeholder texture>",
            ReservedKey::PlaceholderDepth => "<placeholder depth>",
            ReservedKey::DefaultSampler => "<default sampler>",
            ReservedKey::ShadowSampler => "<shadow sampler>",
            ReservedKey::DepthBuffer => "<depth buffer>",
            ReservedKey::IrradianceMap => "<irradiance map>",
        };
        f.write_str(name)
    }
}

/// Registry key: a scene-local name or a reserved slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Named(String),
    Reserved(ReservedKey),
}

impl ResourceKey {
    pub fn named(name: impl Into<String>) -> Self {
        ResourceKey::Named(name.into())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Named(name) => f.write_str(name),
            ResourceKey::Reserved(reserved) => reserved.fmt(f),
        }
    }
}

impl From<ReservedKey> for ResourceKey {
    fn from(reserved: ReservedKey) -> Self {
        ResourceKey::Reserved(reserved)
    }
}

/// Keyed collection preserving insertion order.
///
/// Iteration order is the order of first insertion; re-inserting an
/// existing key replaces the value in place. Registries are populated once
/// during scene initialization and read-only afterwards, so lookups share a
/// hash index over a plain entry vector.
pub struct Registry<T> {
    entries: Vec<(ResourceKey, T)>,
    index: HashMap<ResourceKey, usize>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<ResourceKey>, value: T) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&T> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &ResourceKey) -> Option<&mut T> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn get_named(&self, name: &str) -> Option<&T> {
        self.get(&ResourceKey::named(name))
    }

    pub fn get_mut_named(&mut self, name: &str) -> Option<&mut T> {
        self.get_mut(&ResourceKey::named(name))
    }

    pub fn contains_key(&self, key: &ResourceKey) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &T)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ResourceKey, &mut T)> {
        self.entries.iter_mut().map(|(key, value)| (&*key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_insertion_order() {
        let mut registry = Registry::new();
        registry.insert(ResourceKey::named("b"), 2);
        registry.insert(ResourceKey::named("a"), 1);
        registry.insert(ReservedKey::DepthBuffer, 0);
        registry.insert(ResourceKey::named("c"), 3);

        let values: Vec<i32> = registry.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![2, 1, 0, 3]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut registry = Registry::new();
        registry.insert(ResourceKey::named("a"), 1);
        registry.insert(ResourceKey::named("b"), 2);
        registry.insert(ResourceKey::named("a"), 10);

        let entries: Vec<(String, i32)> = registry
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        assert_eq!(entries, vec![("a".to_string(), 10), ("b".to_string(), 2)]);
    }

    #[test]
    fn reserved_keys_do_not_collide_with_names() {
        let mut registry = Registry::new();
        registry.insert(ResourceKey::named("<depth buffer>"), 1);
        registry.insert(ReservedKey::DepthBuffer, 2);

        assert_eq!(registry.get_named("<depth buffer>"), Some(&1));
        assert_eq!(registry.get(&ReservedKey::DepthBuffer.into()), Some(&2));
    }
}
