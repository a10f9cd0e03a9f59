//! `classify` and `adjacent` commands over the built-in area tables.

use bftmap_core::{AreaDescriptor, SourceKind};
use bftmap_resolver::area::find_centroid;
use bftmap_resolver::paths::partition_path;
use bftmap_resolver::{area_from_address, AreaStrategy, CentroidClassifier};

pub(crate) fn run_classify_point(lat: f64, lng: f64) {
    let area = CentroidClassifier::new().classify(lat, lng);
    print_area(&area);
}

pub(crate) fn run_classify_address(address: &str) {
    match area_from_address(address) {
        Some(area) => print_area(&area),
        None => println!("no Tokyo municipality found in \"{address}\""),
    }
}

/// Prints the expansion neighbors of `name` in the order a search visits them.
///
/// # Errors
///
/// Returns an error if `name` is not in the area tables.
pub(crate) fn run_adjacent(name: &str) -> anyhow::Result<()> {
    let centroid =
        find_centroid(name).ok_or_else(|| anyhow::anyhow!("unknown area '{name}'"))?;
    let area = AreaDescriptor::new(centroid.name, centroid.kind);
    let neighbors = CentroidClassifier::new().adjacent_areas(&area);

    if neighbors.is_empty() {
        println!("{area} has no curated neighbors; searches stop at the area itself");
        return Ok(());
    }

    println!("{:<4}{:<14}KIND", "#", "AREA");
    for (i, neighbor) in neighbors.iter().enumerate() {
        println!("{:<4}{:<14}{}", i + 1, neighbor.name, neighbor.kind);
    }
    Ok(())
}

fn print_area(area: &AreaDescriptor) {
    println!("Area: {area}");
    for source in SourceKind::ALL {
        println!("  {:<9}{}", source.to_string(), partition_path(area, source));
    }
}
