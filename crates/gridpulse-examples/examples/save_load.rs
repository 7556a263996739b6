//! Save/load example: a small city written to disk and read back.
//!
//! Builds production-size electricity, water, district and area state,
//! saves each domain to its own file, then loads them into a fresh host.
//! One domain is deliberately damaged on disk to show the fallback to
//! defaults. Options come from `gridpulse.{ron,toml,json}` in the directory
//! given as the first argument, if any.
//!
//! Run with: `cargo run -p gridpulse-examples --example save_load [settings-dir]`

use std::path::{Path, PathBuf};

use gridpulse_core::guard::UNASSIGNED;
use gridpulse_core::host::{DomainCodec, OwnedHost, install_defaults, load_domain, save_domain};
use gridpulse_core::options::CodecOptions;
use gridpulse_district::{AreaCodec, DistrictCodec};
use gridpulse_fluid::WaterCodec;
use gridpulse_power::{ElectricityCodec, ElectricityPulseGroup, ElectricityPulseUnit};

fn save_to(dir: &Path, tag: &str, blob: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{tag}.bin"));
    std::fs::write(&path, blob)?;
    println!("  wrote {:>8} bytes  {}", blob.len(), path.display());
    Ok(path)
}

/// Load one domain from `path` into `host`, falling back to defaults.
fn load_from<C: DomainCodec>(codec: &C, host: &mut OwnedHost<C::State>, path: &Path) {
    let data = std::fs::read(path).ok();
    match load_domain(codec, host, data.as_deref()) {
        Ok(report) => println!(
            "  {:<12} ok: {} bytes, {} anomalies, {} repaired",
            C::TAG,
            report.bytes_read,
            report.anomalies.len(),
            report.repaired_cells
        ),
        Err(err) => {
            println!("  {:<12} failed ({err}), using defaults", C::TAG);
            install_defaults(codec, host);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = match std::env::args().nth(1) {
        Some(dir) => gridpulse_config::load_options_from_dir(Path::new(&dir))?,
        None => CodecOptions::default(),
    };
    println!("options: {options:?}");

    let dir = std::env::temp_dir().join(format!("gridpulse_save_load_{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;

    // --- Build some state ---

    let electricity = ElectricityCodec::new(options);
    let mut power = electricity.default_state();
    // A short powered line along row 10 belonging to group 0.
    for x in 100..140 {
        if let Some(cell) = power.cell_mut(x, 10) {
            cell.conductivity = 2;
            cell.charge = 50;
            cell.pulse_group = 0;
            cell.electrified = true;
        }
    }
    power.groups.push(ElectricityPulseGroup {
        orig_charge: 2000,
        cur_charge: 1200,
        merge_index: UNASSIGNED,
        merge_count: 0,
        x: 100,
        z: 10,
    });
    power.units.push_back(ElectricityPulseUnit {
        group: 0,
        node: 0,
        x: 140,
        z: 10,
    });

    let water = WaterCodec::new(options);
    let mut pipes = water.default_state();
    for z in 50..60 {
        if let Some(cell) = pipes.cell_mut(200, z) {
            cell.conductivity = 1;
            cell.water_pressure = 30;
            cell.has_water = true;
        }
    }

    let districts = DistrictCodec::new(options);
    let mut zoning = districts.default_state();
    for cell in zoning.districts.iter_mut().take(2000) {
        cell.districts[0] = 1;
    }

    let areas = AreaCodec::new(options);
    let mut map = areas.default_state();
    map.unlock(4, 4);
    map.unlock(4, 5);

    // --- Save ---

    println!("saving to {}", dir.display());
    let power_path = save_to(&dir, ElectricityCodec::TAG, &save_domain(&electricity, &OwnedHost::new(power.clone())))?;
    let water_path = save_to(&dir, WaterCodec::TAG, &save_domain(&water, &OwnedHost::new(pipes.clone())))?;
    let district_path = save_to(&dir, DistrictCodec::TAG, &save_domain(&districts, &OwnedHost::new(zoning)))?;
    let area_path = save_to(&dir, AreaCodec::TAG, &save_domain(&areas, &OwnedHost::new(map)))?;

    // Damage the water file: cut it in half.
    let damaged = std::fs::read(&water_path)?;
    std::fs::write(&water_path, &damaged[..damaged.len() / 2])?;

    // --- Load ---

    println!("loading");
    let mut power_host = OwnedHost::new(electricity.default_state());
    let mut water_host = OwnedHost::new(water.default_state());
    let mut district_host = OwnedHost::new(districts.default_state());
    let mut area_host = OwnedHost::new(areas.default_state());
    load_from(&electricity, &mut power_host, &power_path);
    load_from(&water, &mut water_host, &water_path);
    load_from(&districts, &mut district_host, &district_path);
    load_from(&areas, &mut area_host, &area_path);
    load_from(&areas, &mut area_host, &dir.join("missing.bin"));

    println!(
        "electricity: {} conducting cells, {} groups, {} queued units, matches: {}",
        power_host.state.conductive_cells(),
        power_host.state.groups.len(),
        power_host.state.units.len(),
        power_host.state == power
    );
    println!(
        "water: {} cells with water (saved {})",
        water_host.state.cells.iter().filter(|c| c.has_water).count(),
        pipes.cells.iter().filter(|c| c.has_water).count()
    );
    println!("district at (0, 0): {}", district_host.state.district_at(0, 0));
    println!("unlocked areas: {}", area_host.state.unlocked_count());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
