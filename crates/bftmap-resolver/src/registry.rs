//! Map pin bookkeeping: duplicate suppression and viewport visibility.
//!
//! Facility pins are *sticky-hidden*: once the visibility pass hides a pin
//! because it left the viewport, panning back does not show it again. Only
//! a fresh [`FacilityRegistry::ingest_resolved`] brings it back, as a new
//! entry with a new id. Personal pins are never hidden.

use serde::{Deserialize, Serialize};

use bftmap_core::{ResolvedFacility, ViewportBounds};

/// Default coordinate tolerance for the duplicate check (≈ 11 m).
pub const DEFAULT_DUPLICATE_TOLERANCE_DEG: f64 = 0.000_1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinCategory {
    /// User-created; persisted outside the registry.
    Personal,
    /// Produced by a nearby resolution.
    Facility,
}

/// What a caller asks the registry to pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinCandidate {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl PinCandidate {
    /// Builds a facility candidate; a missing `color` falls back to the
    /// source's marker color.
    #[must_use]
    pub fn from_resolved(facility: &ResolvedFacility) -> Self {
        let record = &facility.record;
        let color = record
            .color
            .clone()
            .unwrap_or_else(|| facility.source.default_color().to_owned());
        let note = [
            record.toilet_name.as_deref(),
            record.floor.as_deref(),
            record.description.as_deref(),
            record.equipment.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

        Self {
            lat: record.lat,
            lng: record.lng,
            name: record.name.clone(),
            color: Some(color),
            note: (!note.is_empty()).then_some(note),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinEntry {
    /// Session-local, strictly increasing, never reused.
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub color: String,
    pub note: Option<String>,
    pub category: PinCategory,
    pub visible: bool,
}

/// Counts from one [`FacilityRegistry::ingest_resolved`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub added: usize,
    pub skipped: usize,
}

const PERSONAL_DEFAULT_COLOR: &str = "#ff6600";

#[derive(Debug, Clone)]
pub struct FacilityRegistry {
    entries: Vec<PinEntry>,
    next_id: u64,
    tolerance_deg: f64,
}

impl Default for FacilityRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_TOLERANCE_DEG)
    }
}

impl FacilityRegistry {
    #[must_use]
    pub fn new(tolerance_deg: f64) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            tolerance_deg,
        }
    }

    /// Pins `candidate` unless an entry with the same name already sits
    /// within the tolerance; returns the stored entry, or `None` for a
    /// rejected duplicate.
    ///
    /// A hidden facility entry does not block a new facility pin: it is
    /// replaced, so the newly ingested pin is visible again.
    pub fn add(&mut self, candidate: PinCandidate, category: PinCategory) -> Option<PinEntry> {
        if let Some(pos) = self.find_duplicate(&candidate) {
            let existing = &self.entries[pos];
            let stale = existing.category == PinCategory::Facility
                && !existing.visible
                && category == PinCategory::Facility;
            if !stale {
                tracing::debug!(name = %candidate.name, "duplicate pin rejected");
                return None;
            }
            let replaced = self.entries.remove(pos);
            tracing::debug!(id = replaced.id, name = %replaced.name, "replacing hidden facility pin");
        }
        Some(self.insert(candidate, category))
    }

    /// Restores a persisted personal pin without the duplicate check.
    pub fn restore(&mut self, candidate: PinCandidate) -> PinEntry {
        self.insert(candidate, PinCategory::Personal)
    }

    /// Pins every facility, counting duplicates instead of stopping at them.
    pub fn ingest_resolved(&mut self, facilities: &[ResolvedFacility]) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for facility in facilities {
            match self.add(PinCandidate::from_resolved(facility), PinCategory::Facility) {
                Some(_) => summary.added += 1,
                None => summary.skipped += 1,
            }
        }
        tracing::debug!(
            added = summary.added,
            skipped = summary.skipped,
            total = self.entries.len(),
            "ingested resolved facilities"
        );
        summary
    }

    /// Hides every visible facility pin outside `bounds` and returns their
    /// ids so the renderer can drop the markers. Hidden pins stay hidden even
    /// when `bounds` covers them again.
    pub fn update_visibility_for_viewport(&mut self, bounds: &ViewportBounds) -> Vec<u64> {
        let hidden: Vec<u64> = self
            .entries
            .iter_mut()
            .filter(|e| e.category == PinCategory::Facility && e.visible)
            .filter(|e| !bounds.contains(e.lat, e.lng))
            .map(|e| {
                e.visible = false;
                e.id
            })
            .collect();
        if !hidden.is_empty() {
            tracing::debug!(hidden = hidden.len(), "facility pins left the viewport");
        }
        hidden
    }

    /// Removes every entry and returns how many there were.
    pub fn clear_all(&mut self) -> usize {
        if self.entries.is_empty() {
            tracing::info!("registry already empty; nothing to clear");
            return 0;
        }
        let cleared = self.entries.len();
        self.entries.clear();
        tracing::info!(cleared, "registry cleared");
        cleared
    }

    /// Removes facility entries only, keeping personal pins.
    pub fn clear_facilities(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.category == PinCategory::Personal);
        before - self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[PinEntry] {
        &self.entries
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = &PinEntry> {
        self.entries.iter().filter(|e| e.visible)
    }

    pub fn personal_entries(&self) -> impl Iterator<Item = &PinEntry> {
        self.entries
            .iter()
            .filter(|e| e.category == PinCategory::Personal)
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&PinEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn tolerance_deg(&self) -> f64 {
        self.tolerance_deg
    }

    fn find_duplicate(&self, candidate: &PinCandidate) -> Option<usize> {
        self.entries.iter().position(|e| {
            e.name == candidate.name
                && (e.lat - candidate.lat).abs() < self.tolerance_deg
                && (e.lng - candidate.lng).abs() < self.tolerance_deg
        })
    }

    fn insert(&mut self, candidate: PinCandidate, category: PinCategory) -> PinEntry {
        let id = self.next_id;
        self.next_id += 1;
        let entry = PinEntry {
            id,
            lat: candidate.lat,
            lng: candidate.lng,
            name: candidate.name,
            color: candidate
                .color
                .unwrap_or_else(|| PERSONAL_DEFAULT_COLOR.to_owned()),
            note: candidate.note,
            category,
            visible: true,
        };
        self.entries.push(entry.clone());
        entry
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
