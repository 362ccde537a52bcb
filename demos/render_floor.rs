//! Print one floor of a JSON snapshot as a text floor plan.
//!
//! Usage: render_floor [snapshot.json] [building-id] [floor-number] [scale]

use std::env;

use floorgrid::service::floor_coverage;
use floorgrid::{JsonFileRepository, RenderOptions, Size, render_floor};

const DEFAULT_SNAPSHOT: &str = "demos/data/tower.json";

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_SNAPSHOT.to_string());
    let building_id = args.next().unwrap_or_else(|| "tower-a".to_string());
    let floor_number: i32 = args.next().as_deref().unwrap_or("1").parse()?;
    let scale: f64 = args.next().as_deref().unwrap_or("0.5").parse()?;

    let repo = JsonFileRepository::new(path);
    let opts = RenderOptions::default().with_scale(scale).with_grid(true);
    let output = render_floor(&repo, &building_id, floor_number, &opts, Size::new(100, 40))?;
    println!("{output}");

    let coverage = floor_coverage(&repo, &building_id, floor_number, 0.5)?;
    println!();
    println!("Scan coverage: {:.0}%", coverage * 100.0);
    Ok(())
}
