//! `nearby` command: one resolution printed as a table or JSON.

use anyhow::Context;
use bftmap_core::AppConfig;
use bftmap_resolver::{
    AnyFetcher, NearbyQuery, Resolution, ResolveMode, SourceOptions, TieredDataSource,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct NearbyArgs {
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
    pub max_count: usize,
    pub integrated: bool,
    pub json: bool,
}

/// Resolves the facilities nearest to the given point and prints them.
///
/// Background preloading is disabled: the process exits right after the
/// single resolution.
///
/// # Errors
///
/// Returns an error if the data base is misconfigured or no data source
/// could be loaded.
pub(crate) async fn run_nearby(config: &AppConfig, args: NearbyArgs) -> anyhow::Result<()> {
    validate(&args)?;

    let fetcher = AnyFetcher::from_config(config)?;
    tracing::debug!(fetcher = %fetcher.describe(), "data source selected");
    let options = SourceOptions {
        preload_enabled: false,
        ..SourceOptions::from_config(config)
    };
    let source = TieredDataSource::new(fetcher, options);

    let query = NearbyQuery {
        lat: args.lat,
        lng: args.lng,
        radius_meters: args.radius_meters,
        max_count: args.max_count,
    };
    let mode = if args.integrated {
        ResolveMode::Integrated
    } else {
        ResolveMode::Tiered
    };

    let resolution = source
        .resolve(query, mode)
        .await
        .context("could not load facility data; check BFTMAP_DATA_BASE and retry")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        print_table(&resolution);
    }
    Ok(())
}

fn validate(args: &NearbyArgs) -> anyhow::Result<()> {
    if !(-90.0..=90.0).contains(&args.lat) || !(-180.0..=180.0).contains(&args.lng) {
        anyhow::bail!("coordinates out of range: {}, {}", args.lat, args.lng);
    }
    if !args.radius_meters.is_finite() || args.radius_meters <= 0.0 {
        anyhow::bail!("--radius must be a positive number of meters");
    }
    if args.max_count == 0 {
        anyhow::bail!("--limit must be at least 1");
    }
    Ok(())
}

fn print_table(resolution: &Resolution) {
    if let Some(area) = &resolution.area {
        println!("Area: {area}");
    }
    println!("Tier: {:?}", resolution.tier);

    if resolution.facilities.is_empty() {
        println!("{}", resolution.outcome.message());
        return;
    }

    println!();
    let header = format!(
        "{:>8}  {:<9}{:<8}{:<30}EQUIPMENT",
        "DIST(m)", "SOURCE", "FLOOR", "NAME"
    );
    println!("{header}");
    for facility in &resolution.facilities {
        let record = &facility.record;
        println!(
            "{:>8.0}  {:<9}{:<8}{:<30}{}",
            facility.distance_meters,
            facility.source.to_string(),
            record.floor.as_deref().unwrap_or("-"),
            truncate(&record.name, 28),
            record.equipment.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("{} result(s)", resolution.facilities.len());
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> NearbyArgs {
        NearbyArgs {
            lat: 35.681,
            lng: 139.767,
            radius_meters: 1_000.0,
            max_count: 10,
            integrated: false,
            json: false,
        }
    }

    #[test]
    fn validate_accepts_tokyo_station() {
        assert!(validate(&args()).is_ok());
    }

    #[test]
    fn validate_rejects_bad_inputs() {
        assert!(validate(&NearbyArgs { lat: 91.0, ..args() }).is_err());
        assert!(validate(&NearbyArgs { radius_meters: 0.0, ..args() }).is_err());
        assert!(validate(&NearbyArgs { radius_meters: f64::NAN, ..args() }).is_err());
        assert!(validate(&NearbyArgs { max_count: 0, ..args() }).is_err());
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("新宿駅", 5), "新宿駅");
        assert_eq!(truncate("東京都庁第一本庁舎", 4), "東京都庁...");
    }
}
