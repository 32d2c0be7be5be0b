//! Declarative event bindings
//!
//! Event keys are `"<event>"` or `"<event> <delegate selector>"`. Delegated
//! handlers are bound once on the component element and fire for the first
//! ancestor of the event target matching the selector.

use std::rc::Rc;

use graft_dom::{ListenerOptions, NodeId, SelectorList};

use crate::definition::{ComponentDefinition, EventCallback};
use crate::{LifecycleError, Result, Runtime};

/// Event key split on its first space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub name: String,
    pub delegate: Option<String>,
}

impl ParsedEvent {
    pub fn parse(key: &str) -> Self {
        match key.split_once(' ') {
            Some((name, delegate)) if !delegate.is_empty() => Self {
                name: name.to_string(),
                delegate: Some(delegate.to_string()),
            },
            Some((name, _)) => Self { name: name.to_string(), delegate: None },
            None => Self { name: key.to_string(), delegate: None },
        }
    }

    /// Delegated `focus`/`blur` listen in the capture phase since they do
    /// not bubble
    pub fn use_capture(&self) -> bool {
        self.delegate.is_some() && matches!(self.name.as_str(), "focus" | "blur")
    }
}

/// One declared event handler
#[derive(Clone)]
pub struct EventBinding {
    pub(crate) key: String,
    pub(crate) event: ParsedEvent,
    pub(crate) handler: EventCallback,
}

impl EventBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn event(&self) -> &ParsedEvent {
        &self.event
    }
}

impl std::fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBinding")
            .field("key", &self.key)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Install a DOM listener for every event binding of `definition`
    pub(crate) fn add_event_listeners(
        &mut self,
        element: NodeId,
        definition: &ComponentDefinition,
    ) -> Result<()> {
        for binding in definition.events() {
            if binding.event.name.is_empty() {
                if self.config.strict {
                    return Err(LifecycleError::InvalidEventKey(binding.key.clone()));
                }
                tracing::warn!(
                    "Ignoring event key `{}` on {}: no event name",
                    binding.key,
                    definition.name()
                );
                continue;
            }

            let handler = Rc::clone(&binding.handler);
            let Some(delegate) = &binding.event.delegate else {
                let options = ListenerOptions::bubble();
                self.add_listener(element, &binding.event.name, options, move |rt, event| {
                    handler(rt, element, event, element)
                })?;
                continue;
            };

            let selector = match SelectorList::parse(delegate) {
                Ok(selector) => selector,
                Err(source) if self.config.strict => {
                    return Err(LifecycleError::InvalidSelector {
                        key: binding.key.clone(),
                        source,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        "Ignoring event key `{}` on {}: {}",
                        binding.key,
                        definition.name(),
                        err
                    );
                    continue;
                }
            };

            let options = if binding.event.use_capture() {
                ListenerOptions::capture()
            } else {
                ListenerOptions::bubble()
            };
            self.add_listener(element, &binding.event.name, options, move |rt, event| {
                match rt.find_delegate(element, event.target, &selector) {
                    Some(matched) => handler(rt, element, event, matched),
                    None => Ok(()),
                }
            })?;
        }
        Ok(())
    }

    /// Walk from `target` towards the root, stopping before the element's
    /// parent or the document node
    fn find_delegate(
        &self,
        element: NodeId,
        target: NodeId,
        selector: &SelectorList,
    ) -> Option<NodeId> {
        let boundary = self.document.parent(element);
        let mut node = Some(target);
        while let Some(current) = node {
            if Some(current) == boundary || current == NodeId::ROOT {
                break;
            }
            if self.document.matches(current, selector) {
                return Some(current);
            }
            node = self.document.parent(current);
        }
        tracing::trace!("No delegate match for {} under {}", target, element);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(
            ParsedEvent::parse("click"),
            ParsedEvent { name: "click".into(), delegate: None }
        );
    }

    #[test]
    fn test_parse_delegate_keeps_rest() {
        let parsed = ParsedEvent::parse("click ul > li.item a");
        assert_eq!(parsed.name, "click");
        assert_eq!(parsed.delegate.as_deref(), Some("ul > li.item a"));
    }

    #[test]
    fn test_parse_trailing_space() {
        assert_eq!(ParsedEvent::parse("click ").delegate, None);
        assert_eq!(ParsedEvent::parse(" .item").name, "");
    }

    #[test]
    fn test_capture_only_for_delegated_focus_blur() {
        assert!(ParsedEvent::parse("focus input").use_capture());
        assert!(ParsedEvent::parse("blur input").use_capture());
        assert!(!ParsedEvent::parse("focus").use_capture());
        assert!(!ParsedEvent::parse("click input").use_capture());
    }
}
