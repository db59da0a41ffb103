//! Type registry: maps tag kind names to the tags that mark declarations
//! as tracked.
//!
//! A declaration whose kind is not registered at the time its class or
//! function is built is treated as an ordinary value. Registration is
//! last-write-wins and is expected to happen once at startup, before any
//! declaration that uses the kind is built.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use hooksett_core::types::{Payload, TypeHint};

/// Name of the built-in tag kind.
pub const TRACED: &str = "Traced";

/// A registered tag kind: builds type hints for the payloads it wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagKind {
    /// Kind name.
    name: Arc<str>,
    /// Optional human-readable description.
    description: Option<String>,
}

impl TagKind {
    /// Creates a tag kind with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            description: None,
        }
    }

    /// Attaches a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the kind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Builds the hint for `T` wrapped by this kind.
    pub fn hint<T: Payload>(&self) -> TypeHint {
        TypeHint::of::<T>(self.name.as_ref())
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Registry of tag kinds, keyed by kind name.
#[derive(Debug)]
pub struct TypeRegistry {
    /// Kind name → tag.
    kinds: DashMap<String, TagKind>,
}

impl TypeRegistry {
    /// Creates a registry holding only the built-in `Traced` kind.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.install_builtins();
        registry
    }

    /// Creates a registry with no kinds at all.
    pub fn empty() -> Self {
        Self {
            kinds: DashMap::new(),
        }
    }

    /// Installs or replaces the tag for `kind_name`.
    ///
    /// Returns the tag previously registered under that name.
    pub fn register(&self, kind_name: impl Into<String>, tag: TagKind) -> Option<TagKind> {
        let kind_name = kind_name.into();
        let previous = self.kinds.insert(kind_name.clone(), tag);

        if previous.is_some() {
            debug!(kind = %kind_name, "Tracked type re-registered, replacing previous tag");
        } else {
            info!(kind = %kind_name, "Tracked type registered");
        }

        previous
    }

    /// Looks up the tag registered for `kind_name`.
    pub fn lookup(&self, kind_name: &str) -> Option<TagKind> {
        self.kinds.get(kind_name).map(|entry| entry.value().clone())
    }

    /// Returns whether `kind_name` marks declarations as tracked.
    pub fn is_tracked(&self, kind_name: &str) -> bool {
        self.kinds.contains_key(kind_name)
    }

    /// Returns all registered kind names, sorted.
    pub fn registered_kinds(&self) -> Vec<String> {
        let mut names: Vec<String> = self.kinds.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns whether no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Drops every custom kind, keeping only the built-ins.
    pub fn reset(&self) {
        self.kinds.clear();
        self.install_builtins();
    }

    fn install_builtins(&self) {
        self.kinds.insert(
            TRACED.to_string(),
            TagKind::new(TRACED).with_description("Generic tracked value"),
        );
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
