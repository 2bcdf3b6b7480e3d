//! Show the establishments around a point, as a map widget would after panning there.
//! Run with: cargo run --example nearby -- 51.5136 -0.0983

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use fhrs_map::geolocation::FixedGeolocator;
use fhrs_map::{Config, FhrsClient, GeoPoint, MapSession, MapSize, MarkerLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let position = match (args.next(), args.next()) {
        (Some(lat), Some(lng)) => GeoPoint::new(
            lat.parse().context("invalid latitude")?,
            lng.parse().context("invalid longitude")?,
        ),
        _ => Config::default().fallback_location,
    };

    let config = Config {
        located_zoom: 17,
        ..Default::default()
    };
    let client = Arc::new(FhrsClient::new(&config.api)?);
    let layer = Arc::new(MarkerLayer::new());
    let size = MapSize::new(1280, 800);

    let session = MapSession::builder(client, layer.clone())
        .with_geolocator(Arc::new(FixedGeolocator::new(position)))
        .with_config(config)
        .with_size(size)
        .spawn()?;

    tokio::time::sleep(Duration::from_secs(5)).await;
    print_markers(&layer);

    log::info!("Switching to top rated only");
    session.set_top_rated_only(true)?;
    tokio::time::sleep(Duration::from_secs(5)).await;
    print_markers(&layer);

    session.shutdown().await;
    Ok(())
}

fn print_markers(layer: &MarkerLayer) {
    for marker in layer.markers() {
        let popup = &marker.popup;
        println!(
            "[{}] {} ({}) at {:.5},{:.5}",
            marker.icon.glyph, popup.name, marker.address, marker.position.lat, marker.position.lng
        );
        for (label, descriptor) in popup.score_lines() {
            println!("      {label}: {descriptor}");
        }
        if let Some(url) = &popup.details_url {
            println!("      {url}");
        }
    }
    println!("{} markers", layer.len());
}
