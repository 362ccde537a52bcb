//! Interactive floor viewer over a JSON snapshot.
//!
//! Usage: floor_viewer [snapshot.json] [building-id]
//!
//! `FLOORGRID_CONFIG` points at a JSON viewer config; `FLOORGRID_LOG` enables
//! JSON-lines logging to that file.

use std::env;
use std::fs;

use floorgrid::{
    CliDriver, FileSink, JsonFileRepository, Logger, Size, ViewerConfig, ViewerRuntime,
};

const DEFAULT_SNAPSHOT: &str = "demos/data/tower.json";
const LOG_CAP_BYTES: u64 = 4 * 1024 * 1024;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_SNAPSHOT.to_string());
    let building_id = args.next().unwrap_or_else(|| "tower-a".to_string());

    let mut config = match env::var("FLOORGRID_CONFIG") {
        Ok(config_path) => ViewerConfig::from_json_str(&fs::read_to_string(config_path)?)?,
        Err(_) => ViewerConfig::default(),
    };
    if let Ok(log_path) = env::var("FLOORGRID_LOG") {
        config = config.with_logger(Logger::new(FileSink::new(log_path, LOG_CAP_BYTES)?));
    }

    let repo = JsonFileRepository::new(path);
    let runtime = ViewerRuntime::new(repo, building_id, config, Size::new(100, 40))?;
    let summary = CliDriver::new(runtime).run()?;
    println!(
        "session: {} events, {} renders ({} skipped), {} fetches ({} failed) in {} ms",
        summary.events,
        summary.renders,
        summary.frames_skipped,
        summary.fetches_issued,
        summary.fetches_failed,
        summary.uptime_ms
    );
    Ok(())
}
