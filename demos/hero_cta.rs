//! Hero CTA Example
//!
//! Buckets a visitor into the portfolio experiments, reports exposures and a
//! conversion, then prints what the sink recorded.
//!
//! Run with: cargo run --example hero_cta
//! Verbose:  RUST_LOG=variant_bucketing=debug cargo run --example hero_cta

use std::sync::Arc;

use variant_bucketing::identity::{IdentityProvider, MemoryIdentityProvider};
use variant_bucketing::logging::init_tracing;
use variant_bucketing::registry::ExperimentRegistry;
use variant_bucketing::tracking::MemoryExposureSink;
use variant_bucketing::ExperimentClient;

fn main() -> variant_bucketing::Result<()> {
    init_tracing("variant_bucketing=info");

    println!("=== variant-bucketing: Portfolio Experiments ===\n");

    // -------------------------------------------------------------------------
    // 1. Load the experiment catalog
    // -------------------------------------------------------------------------
    let registry = Arc::new(ExperimentRegistry::from_json_str(include_str!(
        "experiments.json"
    ))?);
    println!("1. Loaded {} experiments", registry.len());

    // -------------------------------------------------------------------------
    // 2. Bucket this visitor
    // -------------------------------------------------------------------------
    let sink = Arc::new(MemoryExposureSink::new());
    let client = ExperimentClient::new(
        Arc::clone(&registry),
        MemoryIdentityProvider::new(),
        Arc::clone(&sink),
    );
    println!("\n2. Visitor: {}", client.identity().get_or_create_user_id());

    let mut ids: Vec<&str> = registry.experiments().map(|e| e.id()).collect();
    ids.sort_unstable();
    for id in &ids {
        let variant_id = client.variant(id);
        let label = registry
            .get_experiment(id)
            .ok()
            .and_then(|e| e.variant(&variant_id))
            .map_or(variant_id.as_str(), |v| v.name());
        println!("   {id:<14} -> {variant_id:<13} ({label})");
    }

    // A dangling experiment reference degrades to control
    println!("   {:<14} -> {}", "heroBanner", client.variant("heroBanner"));

    // -------------------------------------------------------------------------
    // 3. Track a conversion
    // -------------------------------------------------------------------------
    client.report_conversion("heroCTA", "click");
    println!("\n3. Recorded {} events", sink.len());

    for (variant, tally) in sink.tallies_for_experiment("heroCTA") {
        println!(
            "   heroCTA/{variant}: {} exposures, {} conversions",
            tally.exposures,
            tally.total_conversions()
        );
    }

    Ok(())
}
