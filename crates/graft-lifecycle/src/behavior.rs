//! Component behavior (capability set)
//!
//! Members of a definition's behavior are merged onto each matching element
//! at creation. A member the element already owns is left alone.

use std::fmt;
use std::rc::Rc;

use graft_dom::{NodeId, Property, PropertyValue};

use crate::{LifecycleError, Result, Runtime};

/// Method callable through [`Runtime::call_method`]
pub type MethodCallback =
    Rc<dyn Fn(&mut Runtime, NodeId, &[PropertyValue]) -> anyhow::Result<PropertyValue>>;

/// Behavior member
#[derive(Clone)]
pub enum Member {
    /// Data property, copied onto the element
    Value(PropertyValue),
    Method(MethodCallback),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Member::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// Ordered set of members contributed by a definition
#[derive(Debug, Clone, Default)]
pub struct ComponentBehavior {
    members: Vec<(String, Member)>,
}

impl ComponentBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data member; a later member with the same name replaces it
    pub fn value(self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.member(name, Member::Value(value.into()))
    }

    /// Add a method member
    pub fn method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&mut Runtime, NodeId, &[PropertyValue]) -> anyhow::Result<PropertyValue> + 'static,
    {
        self.member(name, Member::Method(Rc::new(f)))
    }

    fn member(mut self, name: &str, member: Member) -> Self {
        self.members.retain(|(n, _)| n != name);
        self.members.push((name.to_string(), member));
        self
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Runtime {
    /// Merge `behavior` onto `element`; returns the number of members applied
    pub fn apply_behavior(
        &mut self,
        element: NodeId,
        behavior: &ComponentBehavior,
    ) -> Result<usize> {
        let mut applied = 0;
        for (name, member) in behavior.members() {
            if self.has_own_member(element, name) {
                tracing::trace!("{} already owns `{}`, keeping it", element, name);
                continue;
            }
            match member {
                Member::Value(value) => {
                    let property = Property::Data(value.clone());
                    self.document.define_property(element, name, property)?;
                }
                Member::Method(method) => {
                    self.document.element(element)?;
                    self.states.define_method(element, name, Rc::clone(method));
                }
            }
            applied += 1;
        }
        Ok(applied)
    }

    /// Whether `element` owns a property or method called `name`
    pub fn has_own_member(&self, element: NodeId, name: &str) -> bool {
        self.document.has_own_property(element, name)
            || self.states.method(element, name).is_some()
    }

    /// Give `element` its own method, taking precedence over any behavior
    /// merged later
    pub fn define_method<F>(&mut self, element: NodeId, name: &str, f: F) -> Result<()>
    where
        F: Fn(&mut Runtime, NodeId, &[PropertyValue]) -> anyhow::Result<PropertyValue> + 'static,
    {
        self.document.element(element)?;
        self.states.define_method(element, name, Rc::new(f));
        Ok(())
    }

    /// Invoke a method merged onto (or defined on) `element`
    pub fn call_method(
        &mut self,
        element: NodeId,
        name: &str,
        args: &[PropertyValue],
    ) -> Result<PropertyValue> {
        let Some(method) = self.states.method(element, name).cloned() else {
            return Err(LifecycleError::UnknownMethod {
                element,
                name: name.to_string(),
            });
        };
        Ok(method(self, element, args)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_member_replaces_earlier() {
        let behavior = ComponentBehavior::new()
            .value("label", "a")
            .value("count", 1.0)
            .value("label", "b");

        assert_eq!(behavior.len(), 2);
        let names: Vec<_> = behavior.members().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["count", "label"]);
        assert!(matches!(
            behavior.get("label"),
            Some(Member::Value(PropertyValue::Text(t))) if t == "b"
        ));
    }

    #[test]
    fn test_empty_behavior() {
        let behavior = ComponentBehavior::default();
        assert!(behavior.is_empty());
        assert!(behavior.get("x").is_none());
    }
}
