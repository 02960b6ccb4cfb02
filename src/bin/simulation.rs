//! BLE Beacon Simulation
//!
//! Generates synthetic beacon observations for exercising the dashboard.
//! Three device populations are simulated:
//! - Permanent fixtures (always present, strong signal)
//! - Regular visitors (weekday office hours, medium signal)
//! - Passers-by (a single short visit, weak signal)
//!
//! # Usage
//! ```bash
//! ./simulation --days 7 --seed 42 > scans.jsonl
//! ./simulation --days 14 --db ./data/observations.db
//! ```

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc, Weekday};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use beaconscope::storage::SledObservationStore;
use beaconscope::types::Observation;

// ============================================================================
// Signal Constants
// ============================================================================

/// Mean RSSI of permanent fixtures (dBm)
const PERMANENT_RSSI: f64 = -55.0;
/// Mean RSSI of regular visitors (dBm)
const REGULAR_RSSI: f64 = -68.0;
/// Mean RSSI of passers-by (dBm)
const PASSER_RSSI: f64 = -82.0;
/// RSSI standard deviation (dB)
const RSSI_SIGMA: f64 = 4.0;
/// Receiver sensitivity floor and saturation ceiling (dBm)
const RSSI_FLOOR: i32 = -100;
const RSSI_CEILING: i32 = -30;
/// Chance that a present device is heard in a given scan
const DETECTION_PROBABILITY: f64 = 0.85;
/// Share of devices advertising a tx power level
const TX_POWER_SHARE: f64 = 0.5;
/// BLE "tx power not available" sentinel, emitted occasionally
const TX_POWER_UNAVAILABLE: i32 = 127;

/// Regular visitors arrive and leave within these hours (UTC)
const OFFICE_START_HOUR: u32 = 9;
const OFFICE_END_HOUR: u32 = 17;

/// Passer-by visit length bounds (minutes)
const PASSER_MIN_MINUTES: i64 = 1;
const PASSER_MAX_MINUTES: i64 = 90;

const MANUFACTURERS: &[&str] = &["Apple", "Samsung", "Google", "Microsoft", "Garmin", "Tile"];
const SERVICES: &[&str] = &["180f", "180a", "feaa", "fe9f", "fd6f", "0000180d-0000-1000-8000-00805f9b34fb"];

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "beacon-simulation")]
#[command(about = "Synthetic BLE beacon observations for beaconscope testing")]
#[command(version = "1.0")]
struct Args {
    /// Simulated days (1-90)
    #[arg(short, long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=90))]
    days: u32,

    /// Permanent fixtures
    #[arg(long, default_value = "5")]
    permanent: usize,

    /// Regular visitors
    #[arg(long, default_value = "15")]
    regular: usize,

    /// Passers-by per day
    #[arg(long, default_value = "40")]
    passers: usize,

    /// Seconds between scans
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=3600))]
    scan_interval: u32,

    /// First simulated day, RFC 3339 (default: midnight UTC `days` ago)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Write into this sled store instead of stdout
    #[arg(long)]
    db: Option<PathBuf>,

    /// Suppress mission log
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================================
// Device Populations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Population {
    Permanent,
    Regular,
    Passer,
}

impl Population {
    fn mean_rssi(self) -> f64 {
        match self {
            Population::Permanent => PERMANENT_RSSI,
            Population::Regular => REGULAR_RSSI,
            Population::Passer => PASSER_RSSI,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Population::Permanent => "perm",
            Population::Regular => "reg",
            Population::Passer => "pass",
        }
    }
}

/// When a device is in range.
#[derive(Debug, Clone)]
enum Schedule {
    Always,
    /// Weekdays between arrival and departure hour
    OfficeHours { arrive: u32, depart: u32 },
    /// One visit
    Visit { from: DateTime<Utc>, until: DateTime<Utc> },
}

impl Schedule {
    fn present_at(&self, t: DateTime<Utc>) -> bool {
        match self {
            Schedule::Always => true,
            Schedule::OfficeHours { arrive, depart } => {
                !matches!(t.weekday(), Weekday::Sat | Weekday::Sun)
                    && t.hour() >= *arrive
                    && t.hour() < *depart
            }
            Schedule::Visit { from, until } => t >= *from && t <= *until,
        }
    }
}

struct SimDevice {
    fingerprint: String,
    population: Population,
    schedule: Schedule,
    tx_power: Option<i32>,
    manufacturer: Option<&'static str>,
    services: Vec<&'static str>,
    rssi: Normal<f64>,
}

impl SimDevice {
    fn new(
        rng: &mut StdRng,
        population: Population,
        index: usize,
        schedule: Schedule,
    ) -> Result<Self, rand_distr::NormalError> {
        let tx_power = if rng.gen_bool(TX_POWER_SHARE) {
            Some(rng.gen_range(-65..=-55))
        } else {
            None
        };
        // Roughly one in five devices advertises no manufacturer data
        let manufacturer = if rng.gen_bool(0.8) {
            MANUFACTURERS.choose(rng).copied()
        } else {
            None
        };
        let service_count = rng.gen_range(0..=2);
        let services = SERVICES.choose_multiple(rng, service_count).copied().collect();

        Ok(Self {
            fingerprint: format!("sim-{}-{:03}", population.prefix(), index),
            population,
            schedule,
            tx_power,
            manufacturer,
            services,
            rssi: Normal::new(population.mean_rssi(), RSSI_SIGMA)?,
        })
    }

    fn observe(&self, rng: &mut StdRng, t: DateTime<Utc>) -> Observation {
        let rssi = (self.rssi.sample(rng).round() as i32).clamp(RSSI_FLOOR, RSSI_CEILING);
        let mut obs = Observation::new(self.fingerprint.clone(), t, rssi);

        if let Some(tx) = self.tx_power {
            // Some stacks report the "unavailable" sentinel intermittently
            obs = obs.with_tx_power(if rng.gen_bool(0.02) { TX_POWER_UNAVAILABLE } else { tx });
        }
        if let Some(m) = self.manufacturer {
            obs = obs.with_manufacturer(m);
        }
        if !self.services.is_empty() {
            obs = obs.with_services(self.services.iter().copied());
        }
        obs
    }
}

fn build_population(
    rng: &mut StdRng,
    args: &Args,
    start: DateTime<Utc>,
) -> Result<Vec<SimDevice>, rand_distr::NormalError> {
    let mut devices = Vec::new();

    for i in 0..args.permanent {
        devices.push(SimDevice::new(rng, Population::Permanent, i, Schedule::Always)?);
    }

    for i in 0..args.regular {
        let arrive = rng.gen_range(OFFICE_START_HOUR..OFFICE_START_HOUR + 2);
        let depart = rng.gen_range(OFFICE_END_HOUR - 2..=OFFICE_END_HOUR);
        devices.push(SimDevice::new(rng, Population::Regular, i, Schedule::OfficeHours { arrive, depart })?);
    }

    for day in 0..args.days {
        for j in 0..args.passers {
            let from = start
                + Duration::days(i64::from(day))
                + Duration::minutes(rng.gen_range(0..24 * 60));
            let until = from + Duration::minutes(rng.gen_range(PASSER_MIN_MINUTES..=PASSER_MAX_MINUTES));
            let index = day as usize * args.passers + j;
            devices.push(SimDevice::new(rng, Population::Passer, index, Schedule::Visit { from, until })?);
        }
    }

    Ok(devices)
}

// ============================================================================
// Output
// ============================================================================

enum Sink {
    Stdout(BufWriter<io::Stdout>),
    Store { store: SledObservationStore, pending: Vec<Observation> },
}

impl Sink {
    const STORE_BATCH: usize = 5_000;

    fn write(&mut self, obs: Observation) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Sink::Stdout(out) => {
                serde_json::to_writer(&mut *out, &obs)?;
                out.write_all(b"\n")?;
            }
            Sink::Store { store, pending } => {
                pending.push(obs.sanitized());
                if pending.len() >= Self::STORE_BATCH {
                    store.insert_batch(pending)?;
                    pending.clear();
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Sink::Stdout(mut out) => out.flush()?,
            Sink::Store { store, pending } => {
                if !pending.is_empty() {
                    store.insert_batch(&pending)?;
                }
            }
        }
        Ok(())
    }
}

fn log_mission(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("[sim] {}", message);
    }
}

fn default_start(days: u32) -> DateTime<Utc> {
    let today = Utc::now().date_naive();
    let first = today - Duration::days(i64::from(days));
    Utc.from_utc_datetime(&first.and_time(chrono::NaiveTime::MIN))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let start = args.start.unwrap_or_else(|| default_start(args.days));
    let end = start + Duration::days(i64::from(args.days));
    let step = Duration::seconds(i64::from(args.scan_interval));
    let devices = build_population(&mut rng, &args, start)?;

    log_mission(&"=".repeat(60), args.quiet);
    log_mission("BLE BEACON SIMULATION", args.quiet);
    log_mission(&format!("  Window: {} .. {}", start.to_rfc3339(), end.to_rfc3339()), args.quiet);
    log_mission(&format!("  Scan interval: {} s", args.scan_interval), args.quiet);
    log_mission(
        &format!(
            "  Devices: {} permanent, {} regular, {} passers-by",
            args.permanent,
            args.regular,
            args.passers * args.days as usize
        ),
        args.quiet,
    );
    if let Some(seed) = args.seed {
        log_mission(&format!("  Random seed: {}", seed), args.quiet);
    }
    log_mission(&"=".repeat(60), args.quiet);

    let mut sink = match &args.db {
        Some(path) => Sink::Store {
            store: SledObservationStore::open(path)?,
            pending: Vec::new(),
        },
        None => Sink::Stdout(BufWriter::new(io::stdout())),
    };

    let mut generated = 0u64;
    let mut t = start;
    let mut last_day = None;
    while t < end {
        if last_day != Some(t.date_naive()) {
            last_day = Some(t.date_naive());
            log_mission(&format!("  Day {} ({})", t.date_naive(), t.weekday()), args.quiet);
        }

        for device in devices.iter().filter(|d| d.schedule.present_at(t)) {
            if rng.gen_bool(DETECTION_PROBABILITY) {
                sink.write(device.observe(&mut rng, t))?;
                generated += 1;
            }
        }
        t += step;
    }
    sink.finish()?;

    let by_population = |p: Population| devices.iter().filter(|d| d.population == p).count();
    log_mission(
        &format!(
            "Done: {} observations from {} devices ({} permanent, {} regular, {} passers-by)",
            generated,
            devices.len(),
            by_population(Population::Permanent),
            by_population(Population::Regular),
            by_population(Population::Passer),
        ),
        args.quiet,
    );

    Ok(())
}
