//! Domain types shared by the resolver, the CLI, and the HTTP surface.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One barrier-free toilet row as parsed from a dataset partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub address: Option<String>,
    pub floor: Option<String>,
    pub toilet_name: Option<String>,
    /// Free-text part of the raw `note` column.
    pub description: Option<String>,
    /// Equipment part of the raw `note` column, label stripped.
    pub equipment: Option<String>,
    pub color: Option<String>,
    pub lat: f64,
    pub lng: f64,
    /// Columns outside the known schema, keyed by header name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// A [`FacilityRecord`] ranked against a query center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFacility {
    #[serde(flatten)]
    pub record: FacilityRecord,
    pub distance_meters: f64,
    pub source: SourceKind,
}

/// Which family of dataset a partition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Public facilities (city halls, libraries, parks, ...).
    Public,
    /// Railway station facilities.
    Transit,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Public, SourceKind::Transit];

    /// Marker color used when a row carries no `color` cell.
    #[must_use]
    pub fn default_color(self) -> &'static str {
        match self {
            SourceKind::Public => "#00cc00",
            SourceKind::Transit => "#0066cc",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Public => write!(f, "public"),
            SourceKind::Transit => write!(f, "transit"),
        }
    }
}

/// Administrative level of an [`AreaDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    /// One of the 23 special wards.
    Ward,
    /// A Tama-region city.
    City,
    /// A Nishi-Tama town or village.
    Town,
    /// An island municipality.
    Island,
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaKind::Ward => write!(f, "ward"),
            AreaKind::City => write!(f, "city"),
            AreaKind::Town => write!(f, "town"),
            AreaKind::Island => write!(f, "island"),
        }
    }
}

/// The unit of data partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaDescriptor {
    pub name: String,
    pub kind: AreaKind,
}

impl AreaDescriptor {
    pub fn new(name: impl Into<String>, kind: AreaKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for AreaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FacilityRecord {
        FacilityRecord {
            name: "千代田区役所".to_string(),
            address: Some("東京都 千代田区九段南1-2-1".to_string()),
            floor: Some("1F".to_string()),
            toilet_name: None,
            description: None,
            equipment: Some("車椅子対応".to_string()),
            color: None,
            lat: 35.694,
            lng: 139.753_6,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn resolved_facility_serializes_flat() {
        let resolved = ResolvedFacility {
            record: record(),
            distance_meters: 12.5,
            source: SourceKind::Transit,
        };
        let json = serde_json::to_value(&resolved).expect("serialize");
        assert_eq!(json["name"], "千代田区役所");
        assert_eq!(json["distance_meters"], 12.5);
        assert_eq!(json["source"], "transit");
        assert!(json.get("extra").is_none(), "empty extras are omitted");
    }

    #[test]
    fn area_descriptor_display_includes_kind() {
        let area = AreaDescriptor::new("三鷹市", AreaKind::City);
        assert_eq!(area.to_string(), "三鷹市 (city)");
    }

    #[test]
    fn source_kinds_have_distinct_default_colors() {
        assert_ne!(
            SourceKind::Public.default_color(),
            SourceKind::Transit.default_color()
        );
    }
}
