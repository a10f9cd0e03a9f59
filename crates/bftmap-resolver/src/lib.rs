//! Area-tiered nearby-facility resolution.
//!
//! The crate turns a map center into a distance-ranked list of barrier-free
//! toilets by walking a cascade of progressively broader datasets, and keeps
//! the resulting map pins in a [`FacilityRegistry`] whose visibility follows
//! the viewport.

pub mod area;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod paths;
pub mod preload;
pub mod registry;
mod retry;
pub mod session;
pub mod source;

pub use area::{area_from_address, AreaStrategy, CentroidClassifier};
pub use cache::{CacheKey, CacheStats, PartitionCache};
pub use error::ResolverError;
pub use fetch::{AnyFetcher, DatasetFetcher, FsFetcher, HttpFetcher, MemoryFetcher};
pub use parse::{parse_facilities, parse_partition, split_note, ParsedPartition, EQUIPMENT_LABEL};
pub use registry::{
    FacilityRegistry, IngestSummary, PinCandidate, PinCategory, PinEntry,
    DEFAULT_DUPLICATE_TOLERANCE_DEG,
};
pub use session::{NearbySession, SearchReport};
pub use source::{
    NearbyQuery, Resolution, ResolveMode, ResolveOutcome, SourceOptions, Tier, TieredDataSource,
    ESCALATION_FLOOR,
};
