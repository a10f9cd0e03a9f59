//! Dataset row parsing.
//!
//! Partitions are header-first CSV exports. Columns are mapped by header
//! name; unknown columns are carried as extras. Malformed rows are counted
//! and skipped, never fatal.

use std::collections::BTreeMap;

use bftmap_core::FacilityRecord;

/// Label that marks the equipment part of a `note` cell.
pub const EQUIPMENT_LABEL: &str = "設備:";

const KNOWN_COLUMNS: [&str; 8] = [
    "name",
    "address",
    "floor",
    "toilet_name",
    "note",
    "color",
    "lng",
    "lat",
];

/// Output of [`parse_partition`]: the valid records plus how many rows were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPartition {
    pub records: Vec<FacilityRecord>,
    pub skipped_rows: usize,
}

/// Parses a partition into facility records, silently dropping malformed rows.
#[must_use]
pub fn parse_facilities(raw: &str) -> Vec<FacilityRecord> {
    parse_partition(raw).records
}

/// Parses a partition and reports how many data rows were rejected.
///
/// A row is rejected when `name` is empty or when `lat`/`lng` are missing,
/// non-numeric, or non-finite.
#[must_use]
pub fn parse_partition(raw: &str) -> ParsedPartition {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .double_quote(true)
        .from_reader(raw.as_bytes());

    let header: Vec<String> = match reader.headers() {
        Ok(header) => header
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "unreadable dataset header");
            return ParsedPartition::default();
        }
    };

    let mut parsed = ParsedPartition::default();
    for row in reader.records() {
        let record = row
            .ok()
            .and_then(|cells| record_from_cells(&header, cells.iter()));
        match record {
            Some(record) => parsed.records.push(record),
            None => parsed.skipped_rows += 1,
        }
    }

    if parsed.skipped_rows > 0 {
        tracing::debug!(
            kept = parsed.records.len(),
            skipped = parsed.skipped_rows,
            "dropped malformed dataset rows"
        );
    }
    parsed
}

/// Splits a raw `note` cell into `(description, equipment)`.
///
/// - With a pipe: split once; the left part is the description, the right
///   part is the equipment with a leading [`EQUIPMENT_LABEL`] stripped.
/// - Without a pipe but starting with the label: all equipment, empty
///   description.
/// - Otherwise the whole note is the description.
#[must_use]
pub fn split_note(note: &str) -> (String, Option<String>) {
    if let Some((left, right)) = note.split_once('|') {
        let equipment = strip_equipment_label(right.trim()).unwrap_or_else(|| right.trim());
        return (left.trim().to_string(), Some(equipment.to_string()));
    }

    if let Some(equipment) = strip_equipment_label(note.trim()) {
        return (String::new(), Some(equipment.to_string()));
    }

    (note.to_string(), None)
}

fn strip_equipment_label(s: &str) -> Option<&str> {
    s.strip_prefix(EQUIPMENT_LABEL).map(str::trim_start)
}

fn record_from_cells<'a>(
    header: &[String],
    cells: impl Iterator<Item = &'a str>,
) -> Option<FacilityRecord> {
    let mut known: BTreeMap<&str, String> = BTreeMap::new();
    let mut extra = BTreeMap::new();

    for (column, value) in header.iter().zip(cells) {
        if let Some(known_column) = KNOWN_COLUMNS.iter().find(|k| **k == column.as_str()) {
            known.insert(*known_column, value.to_string());
        } else if !column.is_empty() {
            extra.insert(column.clone(), value.to_string());
        }
    }

    let name = known.remove("name").map(|n| n.trim().to_string())?;
    if name.is_empty() {
        return None;
    }
    let lat = parse_coordinate(known.get("lat"))?;
    let lng = parse_coordinate(known.get("lng"))?;

    let mut optional = |column: &str| {
        known
            .remove(column)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let address = optional("address");
    let floor = optional("floor");
    let toilet_name = optional("toilet_name");
    let color = optional("color");
    let (description, equipment) = match optional("note") {
        Some(note) => {
            let (description, equipment) = split_note(&note);
            (Some(description), equipment)
        }
        None => (None, None),
    };

    Some(FacilityRecord {
        name,
        address,
        floor,
        toilet_name,
        description,
        equipment,
        color,
        lat,
        lng,
        extra,
    })
}

fn parse_coordinate(raw: Option<&String>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
