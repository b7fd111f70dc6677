use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::scene::Scene;

/// Builds a scene on the surface it is lent.
pub type SceneFactory<S> = Rc<dyn Fn(&mut S) -> anyhow::Result<Box<dyn Scene<S>>>>;

/// Trigger symbol → scene factory. Built once at startup, read-only afterwards.
pub struct SceneRegistry<S> {
    factories: BTreeMap<char, SceneFactory<S>>,
}

impl<S> Default for SceneRegistry<S> {
    fn default() -> Self {
        Self { factories: BTreeMap::new() }
    }
}

impl<S> fmt::Debug for SceneRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRegistry").field("keys", &self.keys().collect::<Vec<_>>()).finish()
    }
}

impl<S> SceneRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory under `key`. A later registration for the same key wins.
    pub fn register<F>(mut self, key: char, factory: F) -> Self
    where
        F: Fn(&mut S) -> anyhow::Result<Box<dyn Scene<S>>> + 'static,
    {
        if self.factories.insert(key, Rc::new(factory)).is_some() {
            log::warn!("scene registry: key '{key}' registered twice; keeping the last");
        }
        self
    }

    pub fn get(&self, key: char) -> Option<SceneFactory<S>> {
        self.factories.get(&key).cloned()
    }

    pub fn contains(&self, key: char) -> bool {
        self.factories.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.factories.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
