//! Widget registry
//!
//! Maps a container role and widget identifier to the factory building it.

use super::clock::Clock;
use super::widget::{ContainerRole, Widget, WidgetContext};
use super::{WidgetError, WidgetResult};
use std::collections::BTreeMap;
use std::fmt;

/// Builds a widget bound to the container described by the context
pub type WidgetFactory = Box<dyn Fn(&WidgetContext<'_>) -> anyhow::Result<Box<dyn Widget>>>;

/// Registry of widget factories
#[derive(Default)]
pub struct WidgetRegistry {
    factories: BTreeMap<(ContainerRole, String), WidgetFactory>,
}

impl WidgetRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding every widget shipped with the shell
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for role in [ContainerRole::Taskbar, ContainerRole::Desktop] {
            registry.register(role, "clock", |ctx| {
                Ok(Box::new(Clock::from_context(ctx)?) as Box<dyn Widget>)
            });
        }
        registry
    }

    /// Register a factory, replacing any previous one for the same identifier
    pub fn register<F>(&mut self, role: ContainerRole, id: &str, factory: F)
    where
        F: Fn(&WidgetContext<'_>) -> anyhow::Result<Box<dyn Widget>> + 'static,
    {
        if self
            .factories
            .insert((role, id.to_string()), Box::new(factory))
            .is_some()
        {
            tracing::debug!(%role, widget = id, "Replaced widget factory");
        }
    }

    /// Look up the factory for an identifier
    pub fn resolve(&self, role: ContainerRole, id: &str) -> WidgetResult<&WidgetFactory> {
        self.factories
            .get(&(role, id.to_string()))
            .ok_or_else(|| WidgetError::NotFound {
                role,
                id: id.to_string(),
            })
    }

    /// Check if an identifier is registered
    pub fn contains(&self, role: ContainerRole, id: &str) -> bool {
        self.factories.contains_key(&(role, id.to_string()))
    }

    /// Identifiers registered for a role, sorted
    pub fn ids(&self, role: ContainerRole) -> Vec<String> {
        self.factories
            .keys()
            .filter(|(r, _)| *r == role)
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank(String);

    impl Widget for Blank {
        fn id(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn test_builtin_registers_clock() {
        let registry = WidgetRegistry::builtin();
        assert!(registry.contains(ContainerRole::Taskbar, "clock"));
        assert!(registry.contains(ContainerRole::Desktop, "clock"));
        assert!(!registry.contains(ContainerRole::PowerMenu, "clock"));
    }

    #[test]
    fn test_resolve_unknown_identifier() {
        let registry = WidgetRegistry::builtin();
        let err = registry
            .resolve(ContainerRole::Taskbar, "bogus")
            .err()
            .unwrap();
        assert_eq!(
            err,
            WidgetError::NotFound {
                role: ContainerRole::Taskbar,
                id: "bogus".to_string()
            }
        );
    }

    #[test]
    fn test_ids_are_scoped_by_role() {
        let mut registry = WidgetRegistry::new();
        registry.register(ContainerRole::Taskbar, "tray", |ctx| {
            Ok(Box::new(Blank(ctx.id.to_string())) as Box<dyn Widget>)
        });
        registry.register(ContainerRole::Taskbar, "start", |ctx| {
            Ok(Box::new(Blank(ctx.id.to_string())) as Box<dyn Widget>)
        });
        registry.register(ContainerRole::Desktop, "icons", |ctx| {
            Ok(Box::new(Blank(ctx.id.to_string())) as Box<dyn Widget>)
        });

        assert_eq!(registry.ids(ContainerRole::Taskbar), vec!["start", "tray"]);
        assert_eq!(registry.ids(ContainerRole::Desktop), vec!["icons"]);
        assert_eq!(registry.len(), 3);
    }
}
