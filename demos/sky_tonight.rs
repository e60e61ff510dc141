//! Tonight's sky over a fixed site: apparent positions of the Sun, the Moon, Mars and Polaris,
//! then the rise and set times of the next 18 hours.
//!
//! Usage:
//!   sky_tonight [CONFIG.json]
//!
//! Without a configuration file, `de421.bsp` and `hip_main.dat` are read from the working
//! directory. Set `RUST_LOG=skywatch=debug` to follow the loading and the event searches.
use std::env;

use camino::Utf8PathBuf;
use skywatch::{
    almanac::{rise_set::RiseSet, DiscreteEvent},
    apparent::Target,
    config::SkywatchConfig,
    ephemeris::Body,
    observers::GeodeticLocation,
    skywatch::Skywatch,
    skywatch_errors::SkywatchError,
    time::TimePoint,
};
use tracing_subscriber::EnvFilter;

const SITE_LATITUDE: f64 = 38.478752;
const SITE_LONGITUDE: f64 = -107.877739;

fn print_events(events: &[DiscreteEvent<bool>], rise_label: &str, set_label: &str) {
    for event in events {
        let label = match event.rise_set() {
            RiseSet::Rise => rise_label,
            RiseSet::Set => set_label,
        };
        println!("{label}: {}", event.time.to_utc_string(0));
    }
}

fn main() -> Result<(), SkywatchError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match env::args().nth(1) {
        Some(path) => SkywatchConfig::from_json_file(&Utf8PathBuf::from(path))?,
        None => SkywatchConfig {
            star_catalog_path: Some(Utf8PathBuf::from("hip_main.dat")),
            ..Default::default()
        },
    };

    println!("Loading ephemeris {} ...", config.ephemeris_path);
    let sky = Skywatch::new(config)?;
    let polaris = sky.get_star_catalog()?.polaris()?;

    let site = GeodeticLocation::new(SITE_LATITUDE, SITE_LONGITUDE, 0.0)?;
    let now = TimePoint::now()?;

    // civil time of the nearest whole-hour meridian
    let ideal = TimePoint::from_offset(now, site.zone_offset_hours() / 24.0);

    println!("\nCurrent Time:");
    println!("Zulu: {}", now.to_utc_string(0));
    println!("Ideal: {}", ideal.to_utc_string_without_zone(0));

    println!("\nCelestial Object Positions:");
    for (name, target) in [
        ("Sun", Target::from(Body::Sun)),
        ("Moon", Target::from(Body::Moon)),
        ("Mars", Target::from(Body::Mars)),
        ("Polaris", Target::from(polaris)),
    ] {
        let coords = sky.apparent(&site, target, &now)?;
        println!(
            "{name} - Altitude: {:.2}°, Azimuth: {:.2}°",
            coords.altitude, coords.azimuth
        );
    }

    println!("\nNext Rise and Set Times:");
    let end = TimePoint::from_offset(now, 18.0 / 24.0);

    let sun_events = sky.find_discrete(&sky.sunrise_sunset(site), &now, &end)?;
    print_events(&sun_events, "Sunrise", "Sunset");

    let moon_events = sky.find_discrete(&sky.risings_and_settings(Body::Moon, site), &now, &end)?;
    print_events(&moon_events, "Moonrise", "Moonset");

    Ok(())
}
