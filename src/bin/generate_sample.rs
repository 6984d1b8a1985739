use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// Synthetic sensor capture generator (for demos / smoke runs)
// ---------------------------------------------------------------------------

const PROTOCOLS: [&str; 4] = ["tcp", "udp", "icmp", "arp"];
const STATES: [&str; 4] = ["CON", "INT", "FSPA_FSPA", "S_RA"];
const DIRECTIONS: [&str; 3] = ["->", "<->", "<-"];
const LABELS: [&str; 4] = [
    "flow=Background-UDP-Established",
    "flow=From-Normal-V42-Jist",
    "flow=From-Botnet-V42-TCP-Attempt",
    "flow=From-Botnet-V42-TCP-CC-SPAM",
];

fn random_addr(rng: &mut StdRng) -> String {
    format!("147.32.{}.{}", rng.gen_range(80..90), rng.gen_range(1..255))
}

fn write_sensor(dir: &Path, sensor: usize, rows: usize, rng: &mut StdRng) -> Result<PathBuf> {
    let sensor_dir = dir.join(format!("sensor{sensor}"));
    std::fs::create_dir_all(&sensor_dir)
        .with_context(|| format!("creating {}", sensor_dir.display()))?;

    let path = sensor_dir.join(format!("sensor{sensor}.binetflow"));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        "StartTime", "Dur", "Proto", "SrcAddr", "Sport", "Dir", "DstAddr", "Dport", "State",
        "sTos", "dTos", "TotPkts", "TotBytes", "SrcBytes", "Label",
    ])?;

    for i in 0..rows {
        let dur: f64 = rng.gen_range(0.0..3600.0);
        let pkts: u32 = rng.gen_range(1..5000);
        let bytes: u64 = pkts as u64 * rng.gen_range(40..1500);
        let src_bytes = bytes / 2;
        writer.write_record([
            format!("2015/01/{:02} 00:{:02}:{:02}", sensor, i / 60 % 60, i % 60),
            format!("{dur:.6}"),
            PROTOCOLS.choose(rng).unwrap().to_string(),
            random_addr(rng),
            rng.gen_range(1024..65535u32).to_string(),
            DIRECTIONS.choose(rng).unwrap().to_string(),
            random_addr(rng),
            rng.gen_range(1..1024u32).to_string(),
            STATES.choose(rng).unwrap().to_string(),
            "0".to_string(),
            "0".to_string(),
            pkts.to_string(),
            bytes.to_string(),
            src_bytes.to_string(),
            LABELS.choose(rng).unwrap().to_string(),
        ])?;
    }

    writer.flush().context("flushing capture file")?;
    Ok(path)
}

fn main() -> Result<()> {
    env_logger::init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let dir = PathBuf::from(dir);

    let mut rng = StdRng::seed_from_u64(42);
    for sensor in 1..=3 {
        let rows = 200 * sensor;
        let path = write_sensor(&dir, sensor, rows, &mut rng)?;
        println!("Wrote {rows} flows to {}", path.display());
    }
    Ok(())
}
