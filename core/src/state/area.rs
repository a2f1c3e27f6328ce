use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// One (area, optional difficulty mode) pair the log's character entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaVisit {
    pub area: String,
    pub area_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_id: Option<i64>,
}

/// Insertion-ordered list of area visits, deduplicated by area id with the
/// mode upgrade rule. Serializes as a plain array.
///
/// Lookup goes through an id index instead of a linear scan; an upgrade
/// replaces the entry in place, so first-visit order is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AreaVisit>", into = "Vec<AreaVisit>")]
pub struct AreaList {
    entries: Vec<AreaVisit>,
    by_area: HashMap<i64, Vec<usize>>,
}

impl AreaList {
    /// Merge one visit:
    /// - a revisit without a mode is a duplicate of any entry for the area;
    /// - a mode-qualified revisit upgrades a modeless entry in place;
    /// - the same mode again is a duplicate;
    /// - a different mode is a new entry.
    pub fn merge(&mut self, visit: AreaVisit) {
        if let Some(indices) = self.by_area.get(&visit.area_id) {
            for &idx in indices {
                let existing = &mut self.entries[idx];
                if visit.mode_id.is_none() {
                    return;
                }
                if existing.mode_id.is_none() {
                    *existing = visit;
                    return;
                }
                if existing.mode_id == visit.mode_id {
                    return;
                }
            }
        }
        self.by_area
            .entry(visit.area_id)
            .or_default()
            .push(self.entries.len());
        self.entries.push(visit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AreaVisit> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[AreaVisit] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_area.clear();
    }
}

impl From<Vec<AreaVisit>> for AreaList {
    fn from(entries: Vec<AreaVisit>) -> Self {
        let mut list = AreaList::default();
        for visit in entries {
            list.merge(visit);
        }
        list
    }
}

impl From<AreaList> for Vec<AreaVisit> {
    fn from(list: AreaList) -> Self {
        list.entries
    }
}
