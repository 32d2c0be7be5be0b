//! Mutation observers
//!
//! Records are queued when the document changes and handed out later by
//! `take_records`; nothing is delivered inside the mutating call.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{DomError, NodeId, Result};

/// Mutation observer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_list(mut self) -> Self {
        self.child_list = true;
        self
    }

    pub fn attributes(mut self) -> Self {
        self.attributes = true;
        self
    }

    pub fn subtree(mut self) -> Self {
        self.subtree = true;
        self
    }

    pub fn attribute_old_value(mut self) -> Self {
        self.attribute_old_value = true;
        self.attributes = true;
        self
    }

    pub fn attribute_filter(mut self, filter: Vec<String>) -> Self {
        self.attribute_filter = Some(filter);
        self.attributes = true;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.child_list && !self.attributes && !self.character_data {
            return Err(DomError::InvalidObserverOptions(
                "at least one of child_list, attributes or character_data must be set",
            ));
        }
        if self.attribute_old_value && !self.attributes {
            return Err(DomError::InvalidObserverOptions(
                "attribute_old_value requires attributes",
            ));
        }
        Ok(())
    }

    fn wants_attribute(&self, name: &str) -> bool {
        let listed = |filter: &Vec<String>| filter.iter().any(|f| f == name);
        self.attributes && self.attribute_filter.as_ref().map_or(true, listed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    /// Create an attribute mutation record
    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    /// Create a child list mutation record
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn with_siblings(mut self, previous: Option<NodeId>, next: Option<NodeId>) -> Self {
        self.previous_sibling = previous;
        self.next_sibling = next;
        self
    }
}

#[derive(Debug, Default)]
struct ObserverEntry {
    targets: Vec<NodeId>,
    records: Vec<MutationRecord>,
}

/// All observers of one document
///
/// Registrations are indexed by target node, so queuing a record only
/// looks at the nodes on the mutation's ancestor path.
#[derive(Debug, Default)]
pub(crate) struct ObserverRegistry {
    /// Ordered by id, which is creation order
    entries: BTreeMap<ObserverId, ObserverEntry>,
    registrations: HashMap<NodeId, Vec<(ObserverId, MutationObserverInit)>>,
    next_id: u32,
}

impl ObserverRegistry {
    pub fn create(&mut self) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, ObserverEntry::default());
        id
    }

    fn entry_mut(&mut self, id: ObserverId) -> Result<&mut ObserverEntry> {
        self.entries.get_mut(&id).ok_or(DomError::UnknownObserver(id))
    }

    pub fn observe(
        &mut self,
        id: ObserverId,
        target: NodeId,
        options: MutationObserverInit,
    ) -> Result<()> {
        options.validate()?;
        let entry = self.entry_mut(id)?;
        if !entry.targets.contains(&target) {
            entry.targets.push(target);
        }

        // Re-observing a target replaces its options
        let registrations = self.registrations.entry(target).or_default();
        registrations.retain(|(observer, _)| *observer != id);
        registrations.push((id, options));
        Ok(())
    }

    pub fn disconnect(&mut self, id: ObserverId) -> Result<()> {
        let entry = self.entry_mut(id)?;
        let targets = std::mem::take(&mut entry.targets);
        entry.records.clear();
        self.unregister(id, &targets);
        Ok(())
    }

    /// Disconnect and forget the observer; its id is unknown afterwards
    pub fn remove(&mut self, id: ObserverId) -> Result<()> {
        let entry = self.entries.remove(&id).ok_or(DomError::UnknownObserver(id))?;
        self.unregister(id, &entry.targets);
        Ok(())
    }

    fn unregister(&mut self, id: ObserverId, targets: &[NodeId]) {
        for target in targets {
            if let Some(registrations) = self.registrations.get_mut(target) {
                registrations.retain(|(observer, _)| *observer != id);
                if registrations.is_empty() {
                    self.registrations.remove(target);
                }
            }
        }
    }

    pub fn take_records(&mut self, id: ObserverId) -> Result<Vec<MutationRecord>> {
        Ok(std::mem::take(&mut self.entry_mut(id)?.records))
    }

    pub fn is_observing(&self, id: ObserverId, target: NodeId) -> bool {
        self.registrations
            .get(&target)
            .is_some_and(|registrations| registrations.iter().any(|(observer, _)| *observer == id))
    }

    /// Observers with queued records, in creation order
    pub fn pending(&self) -> Vec<ObserverId> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.records.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Registrations covering `path[0]`, directly or through a subtree ancestor
    fn interest<'a>(
        &'a self,
        path: &'a [NodeId],
    ) -> impl Iterator<Item = (ObserverId, &'a MutationObserverInit)> + 'a {
        path.iter().enumerate().flat_map(move |(pos, node)| {
            self.registrations
                .get(node)
                .into_iter()
                .flatten()
                .filter(move |(_, init)| pos == 0 || init.subtree)
                .map(|(id, init)| (*id, init))
        })
    }

    /// Queue an attribute record; `path` runs from the target up to the top
    pub fn queue_attribute(&mut self, path: &[NodeId], name: &str, old_value: Option<&str>) {
        let Some(&target) = path.first() else { return };

        // One record per observer; the old value is kept if any of its
        // registrations asked for it
        let mut wanted: BTreeMap<ObserverId, bool> = BTreeMap::new();
        for (id, init) in self.interest(path) {
            if init.wants_attribute(name) {
                *wanted.entry(id).or_default() |= init.attribute_old_value;
            }
        }

        for (id, keep_old) in wanted {
            let old = if keep_old { old_value.map(str::to_string) } else { None };
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.records.push(MutationRecord::attribute(target, name, old));
            }
        }
    }

    /// Queue a child list record for every interested observer
    pub fn queue_child_list(&mut self, path: &[NodeId], record: MutationRecord) {
        let wanted: BTreeSet<ObserverId> = self
            .interest(path)
            .filter(|(_, init)| init.child_list)
            .map(|(id, _)| id)
            .collect();

        for id in wanted {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.records.push(record.clone());
            }
        }
    }
}
