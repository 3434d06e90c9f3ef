//! Synthetic sensor frames.
//!
//! No real sensor interface exists anywhere in this project: every channel is
//! mock data shaped like the instruments it stands in for. Magnetometer and
//! gravimeter readings, geolocation pairs, free-text manifests with an
//! occasional over-weight anomaly, and a Savitzky–Golay-smoothed THz noise
//! trace derived from detector NEP and bandwidth.

use rand::Rng;

use crate::config::ScreenConfig;

/// One synthetic cargo frame: parallel per-container channels.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    /// Magnetometer channel (T), ~1e-9 scale.
    pub mag: Vec<f64>,
    /// Gravimeter channel, scaled to mass via `ScreenConfig::grav_mass_scale`.
    pub grav: Vec<f64>,
    /// Binary inspection labels.
    pub labels: Vec<u8>,
    /// `[lat, lon]` pairs.
    pub locations: Vec<[f64; 2]>,
    /// Free-text manifests; declared weight is the last digit group.
    pub manifests: Vec<String>,
}

impl SensorFrame {
    pub fn len(&self) -> usize {
        self.mag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mag.is_empty()
    }
}

/// Generate a frame of `n` containers.
///
/// Roughly one container in ten carries a manifest declaring double the
/// nominal weight, so the manifest-discrepancy term has something to find.
pub fn synth_frame(n: usize, cfg: &ScreenConfig, rng: &mut impl Rng) -> SensorFrame {
    let mut mag = Vec::with_capacity(n);
    let mut grav = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    let mut locations = Vec::with_capacity(n);
    let mut manifests = Vec::with_capacity(n);

    for _ in 0..n {
        mag.push(rng.random::<f64>() * 1e-9);
        // Gravimeter reading consistent with ~50 kg of honest cargo. Sensor
        // noise stays below the manifest tolerance so only the planted
        // over-weight manifests trip the discrepancy term.
        let true_mass = 50.0 * (1.0 + 1e-6 * sample_standard_normal(rng));
        grav.push(true_mass / cfg.grav_mass_scale);
        labels.push(u8::from(rng.random::<f64>() > 0.5));
        locations.push([rng.random::<f64>(), rng.random::<f64>()]);
        manifests.push(if rng.random::<f64>() > 0.1 {
            "cargo: electronics 50kg".to_string()
        } else {
            "cargo: hidden 100kg".to_string()
        });
    }

    SensorFrame {
        mag,
        grav,
        labels,
        locations,
        manifests,
    }
}

/// Simulated THz detector trace: zero-mean Gaussian with
/// sigma = NEP * sqrt(bandwidth), Savitzky–Golay smoothed.
pub fn thz_trace(cfg: &ScreenConfig, rng: &mut impl Rng) -> Vec<f64> {
    let sigma = cfg.nep * cfg.bandwidth_hz.sqrt();
    let raw: Vec<f64> = (0..cfg.thz_samples)
        .map(|_| sigma * sample_standard_normal(rng))
        .collect();
    savgol_smooth(&raw)
}

/// Savitzky–Golay smoothing, window 5, polynomial order 2.
///
/// Fixed convolution weights (-3, 12, 17, 12, -3)/35; the two samples at each
/// edge pass through unchanged.
pub fn savgol_smooth(data: &[f64]) -> Vec<f64> {
    if data.len() < 5 {
        return data.to_vec();
    }
    const W: [f64; 5] = [-3.0, 12.0, 17.0, 12.0, -3.0];
    let mut out = data.to_vec();
    for i in 2..data.len() - 2 {
        let mut acc = 0.0;
        for (k, w) in W.iter().enumerate() {
            acc += w * data[i + k - 2];
        }
        out[i] = acc / 35.0;
    }
    out
}

/// Box-Muller standard normal draw.
pub(crate) fn sample_standard_normal(rng: &mut impl Rng) -> f64 {
    let u1 = rng.random::<f64>().clamp(f64::MIN_POSITIVE, 1.0);
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
