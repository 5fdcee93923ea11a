//! The engine - owner of templates and their capability token.
//!
//! Every template is created by exactly one engine and carries that engine's
//! [`EngineToken`]. Inheritance and mixin composition only accept templates
//! whose token matches, so two engines never share type layouts.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use typecraft_core::{EngineToken, TemplateId};

use crate::Template;

/// Factory and registry for templates.
///
/// Cloning the handle is cheap and every clone refers to the same engine.
#[derive(Clone)]
pub struct Engine(Rc<EngineInner>);

pub(crate) struct EngineInner {
    token: EngineToken,
    next_id: Cell<u32>,
    named: RefCell<FxHashMap<String, Template>>,
}

impl Engine {
    pub fn new() -> Self {
        let engine = Self(Rc::new(EngineInner {
            token: EngineToken::mint(),
            next_id: Cell::new(0),
            named: RefCell::new(FxHashMap::default()),
        }));
        tracing::debug!(token = %engine.0.token, "engine created");
        engine
    }

    pub(crate) fn from_inner(inner: Rc<EngineInner>) -> Self {
        Self(inner)
    }

    /// Create an anonymous template.
    pub fn template(&self) -> Template {
        self.create(None)
    }

    /// Get the template registered under `name`, creating it if needed.
    pub fn named(&self, name: &str) -> Template {
        if let Some(existing) = self.lookup(name) {
            return existing;
        }
        let template = self.create(Some(name.to_string()));
        self.0
            .named
            .borrow_mut()
            .insert(name.to_string(), template.clone());
        tracing::debug!(name, id = %template.id(), "named template registered");
        template
    }

    /// Get the template registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Template> {
        self.0.named.borrow().get(name).cloned()
    }

    /// Remove `name` from the registry.
    ///
    /// Existing handles and instances stay valid; only the name is released.
    pub fn destroy(&self, name: &str) -> bool {
        let removed = self.0.named.borrow_mut().remove(name).is_some();
        if removed {
            tracing::debug!(name, "named template destroyed");
        }
        removed
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.named.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn token(&self) -> EngineToken {
        self.0.token
    }

    /// Check if `template` was created by this engine.
    pub fn owns(&self, template: &Template) -> bool {
        template.engine_token() == self.0.token
    }

    pub fn ptr_eq(&self, other: &Engine) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn create(&self, name: Option<String>) -> Template {
        let id = TemplateId::new(self.0.next_id.get());
        self.0.next_id.set(id.index() + 1);
        tracing::trace!(%id, ?name, "template created");
        Template::new(id, self.0.token, name, Rc::downgrade(&self.0))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("token", &self.0.token)
            .field("templates", &self.0.next_id.get())
            .field("named", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_ids_are_sequential() {
        let engine = Engine::new();
        let a = engine.template();
        let b = engine.template();
        assert_eq!(a.id(), TemplateId::new(0));
        assert_eq!(b.id(), TemplateId::new(1));
    }

    #[test]
    fn named_templates_are_shared() {
        let engine = Engine::new();
        let a = engine.named("Animal");
        let b = engine.named("Animal");
        assert!(a.ptr_eq(&b));
        assert_eq!(a.name(), Some("Animal"));
        assert_eq!(engine.names(), vec!["Animal"]);
    }

    #[test]
    fn destroy_releases_the_name() {
        let engine = Engine::new();
        let a = engine.named("Animal");
        assert!(engine.destroy("Animal"));
        assert!(!engine.destroy("Animal"));
        assert!(engine.lookup("Animal").is_none());
        let b = engine.named("Animal");
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn engines_have_distinct_tokens() {
        let first = Engine::new();
        let second = Engine::new();
        assert_ne!(first.token(), second.token());
        assert!(first.owns(&first.template()));
        assert!(!first.owns(&second.template()));
    }

    #[test]
    fn extend_named_resolves_through_the_engine() {
        let engine = Engine::new();
        let base = engine.named("Base");
        let derived = engine.template().extend_named("Base").unwrap();
        assert!(derived.parent().unwrap().ptr_eq(&base));
    }
}
