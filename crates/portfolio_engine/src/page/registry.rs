use crate::dom::ElementId;

use super::EventKind;

/// Index of a feature in its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId(pub(crate) usize);

/// What a registration listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Document,
    Node(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub feature: FeatureId,
    pub kind: EventKind,
    pub target: Target,
}

/// Event routing table, built once at bootstrap. Rows are unique and keep
/// insertion order, which is also dispatch order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rows: Vec<Registration>,
}

impl Registry {
    pub fn add(&mut self, feature: FeatureId, kind: EventKind, target: Target) -> bool {
        let row = Registration {
            feature,
            kind,
            target,
        };
        if self.rows.contains(&row) {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn remove(&mut self, feature: FeatureId, kind: EventKind, target: Target) -> bool {
        let before = self.rows.len();
        self.rows
            .retain(|row| !(row.feature == feature && row.kind == kind && row.target == target));
        self.rows.len() != before
    }

    pub fn remove_feature(&mut self, feature: FeatureId) {
        self.rows.retain(|row| row.feature != feature);
    }

    pub fn listeners(&self, kind: EventKind, target: Target) -> Vec<FeatureId> {
        self.rows
            .iter()
            .filter(|row| row.kind == kind && row.target == target)
            .map(|row| row.feature)
            .collect()
    }

    pub fn contains(&self, feature: FeatureId, kind: EventKind, target: Target) -> bool {
        self.rows
            .iter()
            .any(|row| row.feature == feature && row.kind == kind && row.target == target)
    }

    pub fn rows(&self) -> &[Registration] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
