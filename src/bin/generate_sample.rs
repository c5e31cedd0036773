use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use bench_plots::config::{IvConfig, OverlayConfig};
use bench_plots::iv::IvRequest;

/// Write synthetic SLDO and IV measurement files for trying out the plotters.
#[derive(Parser)]
#[command(name = "generate-sample")]
struct Cli {
    /// Directory to populate
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
    /// Seed for the noise generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Seeded gaussian measurement noise (splitmix64 feeding a polar Box-Muller).
struct Noise {
    state: u64,
    spare: Option<f64>,
}

impl Noise {
    fn seeded(seed: u64) -> Self {
        Self { state: seed, spare: None }
    }

    fn uniform(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// A sample with standard deviation `sigma` around zero.
    fn sample(&mut self, sigma: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return sigma * z;
        }
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * scale);
                return sigma * u * scale;
            }
        }
    }
}

/// Expected SLDO input voltage of the 2x2 HDI V3 hybrid at a given load.
fn vin_expected(current: f64) -> f64 {
    1.55 + 0.021 * current
}

fn write_sldo(path: &Path, position: usize, config: &OverlayConfig, noise: &mut Noise) -> Result<()> {
    // Position 8 lacks the last ROC's analog rail, position 1 carries the reference.
    let parameters: Vec<&String> = config
        .parameters
        .iter()
        .filter(|p| !(position == 8 && p.as_str() == "VDDA_ROC3"))
        .collect();

    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    let mut header: Vec<&str> = vec![config.x_column.as_str()];
    header.extend(parameters.iter().map(|p| p.as_str()));
    if position == 1 {
        header.push(config.reference_column.as_str());
    }
    writer.write_record(&header)?;

    let offset = 0.01 * position as f64;
    // Even positions were swept downwards.
    let mut steps: Vec<usize> = (0..=20).collect();
    if position % 2 == 0 {
        steps.reverse();
    }

    for step in steps {
        let current = step as f64 * 0.5;
        let vin = vin_expected(current) + offset + noise.sample(0.004);
        let mut row = vec![format!("{current:.3}")];
        for param in &parameters {
            let value = match param.as_str() {
                "Voltage (V)" => vin + 0.08 + 0.004 * current,
                "VIN" => vin,
                "VOFS" => 0.8 + 0.5 * offset + noise.sample(0.002),
                p if p.starts_with("VDDD") => 1.20 - 0.002 * current + noise.sample(0.003),
                p if p.starts_with("VDDA") => 1.22 - 0.001 * current + noise.sample(0.003),
                _ => noise.sample(1.0),
            };
            row.push(format!("{value:.5}"));
        }
        if position == 1 {
            row.push(format!("{:.5}", vin_expected(current)));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_iv(path: &Path, noise: &mut Noise) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Time (s)", "Voltage (V)", "Current (A)"])?;
    for step in 0..=30 {
        let bias = step as f64 * 10.0;
        // Flat leakage with a soft breakdown above 250 V.
        let leakage = 0.15e-6 + 2.0e-9 * bias + 1e-9 * ((bias - 250.0).max(0.0)).powi(2);
        let current = -(leakage + noise.sample(5e-9));
        writer.write_record([
            format!("{:.1}", step as f64 * 2.5),
            format!("{:.1}", -bias),
            format!("{current:.6e}"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut noise = Noise::seeded(cli.seed);

    let overlay = OverlayConfig::default();
    for (i, (folder, file)) in overlay.folders.iter().zip(&overlay.files).enumerate() {
        let dir = cli.out.join(folder);
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        write_sldo(&dir.join(file), i + 1, &overlay, &mut noise)?;
    }

    let request = IvRequest::new("P-1009", "17022026", "0");
    let iv_path = request.input_path(&cli.out.join(IvConfig::default().data_dir));
    if let Some(dir) = iv_path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    write_iv(&iv_path, &mut noise)?;

    println!(
        "Wrote {} SLDO tables and {} to {}",
        overlay.folders.len(),
        iv_path.display(),
        cli.out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_reproducible_per_seed() {
        let mut a = Noise::seeded(7);
        let mut b = Noise::seeded(7);
        for _ in 0..10 {
            assert_eq!(a.sample(1.0), b.sample(1.0));
        }
        assert_ne!(Noise::seeded(7).sample(1.0), Noise::seeded(8).sample(1.0));
    }

    #[test]
    fn noise_has_requested_spread() {
        let mut noise = Noise::seeded(42);
        let samples: Vec<f64> = (0..20_000).map(|_| noise.sample(2.0)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.1, "std {}", var.sqrt());
    }
}
