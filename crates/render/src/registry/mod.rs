//! Component registry: maps component tag names to HTML renderers.

/// Typed custom block props.
pub mod blocks;
/// Built-in component renderers.
pub mod defaults;
/// Card icons.
pub mod icons;

use crate::html::HtmlWriter;
use crate::tree::Component;
use std::collections::HashMap;

pub use blocks::{
    AlertBlock, AlertVariant, BlockError, CARD_COMPONENT, Card, CardGrid, CustomBlock, Diagram,
    FramedImage,
};
pub use defaults::default_registry;

/// Writes one component as HTML.
pub type ComponentRenderer = fn(&Component, &mut HtmlWriter<'_>);

/// Component name to renderer table with a fallback for unknown names.
#[derive(Clone)]
pub struct ComponentRegistry {
    renderers: HashMap<String, ComponentRenderer>,
    fallback: ComponentRenderer,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish_non_exhaustive()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Creates an empty registry; every component goes to the fallback.
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: defaults::render_unknown,
        }
    }

    /// Registers a renderer, returning the one it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        renderer: ComponentRenderer,
    ) -> Option<ComponentRenderer> {
        self.renderers.insert(name.into(), renderer)
    }

    /// Builder form of [`ComponentRegistry::register`].
    pub fn with(mut self, name: impl Into<String>, renderer: ComponentRenderer) -> Self {
        self.register(name, renderer);
        self
    }

    /// Replaces the renderer used for unregistered names.
    pub fn set_fallback(&mut self, renderer: ComponentRenderer) {
        self.fallback = renderer;
    }

    /// Returns true if `name` has its own renderer.
    pub fn contains(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Renderer for `name`, or the fallback.
    pub fn resolve(&self, name: &str) -> ComponentRenderer {
        self.renderers.get(name).copied().unwrap_or(self.fallback)
    }
}
