//! Pointer-trace kinematics screening
//!
//! A secondary movement stream: timestamped pointer positions from a tracking
//! task. Position deltas become velocity and acceleration profiles, each
//! metric is banded against research-informed ranges, and the band pattern
//! maps to a motor profile with a confidence score.

use serde::{Deserialize, Serialize};

/// Avoids division blow-ups on duplicate timestamps
const TIME_EPSILON: f64 = 1e-6;

// Band boundaries per metric: (low, high). Below low is Normal, above high
// is Elevated, in between Borderline.
const TOTAL_DISTANCE_BAND: (f64, f64) = (1000.0, 4000.0);
const MAX_VELOCITY_BAND: (f64, f64) = (300.0, 1000.0);
const MAX_ACCELERATION_BAND: (f64, f64) = (5000.0, 20000.0);
const VELOCITY_STD_BAND: (f64, f64) = (100.0, 500.0);
const ACCELERATION_STD_BAND: (f64, f64) = (1000.0, 5000.0);
const DIRECTION_CHANGES_BAND: (f64, f64) = (5.0, 20.0);

/// One timestamped pointer position (time in seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
}

/// Aggregate kinematics for a pointer trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerKinematics {
    pub total_distance: f64,
    pub mean_velocity: f64,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub velocity_std: f64,
    pub acceleration_std: f64,
    /// Significant reversals: consecutive deltas with a negative dot product
    pub direction_changes: u32,
}

/// Classification band for one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Normal,
    Borderline,
    Elevated,
}

/// Per-metric bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicsBands {
    pub total_distance: Band,
    pub max_velocity: Band,
    pub max_acceleration: Band,
    pub velocity_std: Band,
    pub acceleration_std: Band,
    pub direction_changes: Band,
}

impl KinematicsBands {
    fn all(&self) -> [Band; 6] {
        [
            self.total_distance,
            self.max_velocity,
            self.max_acceleration,
            self.velocity_std,
            self.acceleration_std,
            self.direction_changes,
        ]
    }
}

/// Motor pattern suggested by the band combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorProfile {
    None,
    Hyperactive,
    Inattentive,
    Combined,
}

/// Full screening report for one pointer trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicsReport {
    pub metrics: PointerKinematics,
    pub bands: KinematicsBands,
    pub profile: MotorProfile,
    /// 0-100
    pub confidence: f64,
}

/// Screens pointer traces for motor-pattern indicators
pub struct PointerKinematicsAnalyzer;

impl PointerKinematicsAnalyzer {
    /// Analyze one trace. Fewer than two samples yields all-zero metrics and
    /// a `None` profile.
    pub fn analyze(samples: &[PointerSample]) -> KinematicsReport {
        let metrics = compute_metrics(samples);
        let bands = band_metrics(&metrics);
        let profile = determine_profile(&bands);
        let confidence = confidence_for(&bands, profile);

        KinematicsReport {
            metrics,
            bands,
            profile,
            confidence,
        }
    }
}

fn compute_metrics(samples: &[PointerSample]) -> PointerKinematics {
    if samples.len() < 2 {
        return PointerKinematics {
            total_distance: 0.0,
            mean_velocity: 0.0,
            max_velocity: 0.0,
            max_acceleration: 0.0,
            velocity_std: 0.0,
            acceleration_std: 0.0,
            direction_changes: 0,
        };
    }

    let mut deltas = Vec::with_capacity(samples.len() - 1);
    let mut velocities = Vec::with_capacity(samples.len() - 1);
    let mut total_distance = 0.0;

    for pair in samples.windows(2) {
        let dt = pair[1].time - pair[0].time;
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        let distance = (dx * dx + dy * dy).sqrt();

        total_distance += distance;
        velocities.push(distance / (dt + TIME_EPSILON));
        deltas.push((dx, dy, dt));
    }

    let mut accelerations = Vec::with_capacity(velocities.len().saturating_sub(1));
    for (pair, delta) in velocities.windows(2).zip(deltas.iter().skip(1)) {
        accelerations.push((pair[1] - pair[0]) / (delta.2 + TIME_EPSILON));
    }

    let direction_changes = deltas
        .windows(2)
        .filter(|pair| {
            let (dx0, dy0, _) = pair[0];
            let (dx1, dy1, _) = pair[1];
            dx0 * dx1 + dy0 * dy1 < 0.0
        })
        .count() as u32;

    let abs_accelerations: Vec<f64> = accelerations.iter().map(|a| a.abs()).collect();

    PointerKinematics {
        total_distance,
        mean_velocity: crate::stats::mean(&velocities),
        max_velocity: crate::stats::max(&velocities),
        max_acceleration: crate::stats::max(&abs_accelerations),
        velocity_std: crate::stats::population_std(&velocities),
        acceleration_std: crate::stats::population_std(&accelerations),
        direction_changes,
    }
}

fn band(value: f64, bounds: (f64, f64)) -> Band {
    if value < bounds.0 {
        Band::Normal
    } else if value > bounds.1 {
        Band::Elevated
    } else {
        Band::Borderline
    }
}

fn band_metrics(metrics: &PointerKinematics) -> KinematicsBands {
    KinematicsBands {
        total_distance: band(metrics.total_distance, TOTAL_DISTANCE_BAND),
        max_velocity: band(metrics.max_velocity, MAX_VELOCITY_BAND),
        max_acceleration: band(metrics.max_acceleration, MAX_ACCELERATION_BAND),
        velocity_std: band(metrics.velocity_std, VELOCITY_STD_BAND),
        acceleration_std: band(metrics.acceleration_std, ACCELERATION_STD_BAND),
        direction_changes: band(metrics.direction_changes as f64, DIRECTION_CHANGES_BAND),
    }
}

fn determine_profile(bands: &KinematicsBands) -> MotorProfile {
    let hyperactive =
        bands.max_velocity == Band::Elevated || bands.max_acceleration == Band::Elevated;
    let inattentive =
        bands.velocity_std == Band::Elevated || bands.direction_changes == Band::Elevated;

    match (hyperactive, inattentive) {
        (true, true) => MotorProfile::Combined,
        (true, false) => MotorProfile::Hyperactive,
        (false, true) => MotorProfile::Inattentive,
        (false, false) => MotorProfile::None,
    }
}

fn confidence_for(bands: &KinematicsBands, profile: MotorProfile) -> f64 {
    let all = bands.all();
    if profile == MotorProfile::None {
        let normal = all.iter().filter(|&&b| b == Band::Normal).count();
        return normal as f64 / all.len() as f64 * 100.0;
    }
    let elevated = all.iter().filter(|&&b| b == Band::Elevated).count() as f64;
    let borderline = all.iter().filter(|&&b| b == Band::Borderline).count() as f64;
    (elevated * 15.0 + borderline * 5.0 + 30.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(points: &[(f64, f64, f64)]) -> Vec<PointerSample> {
        points
            .iter()
            .map(|&(time, x, y)| PointerSample { time, x, y })
            .collect()
    }

    #[test]
    fn test_too_few_samples_is_benign() {
        let report = PointerKinematicsAnalyzer::analyze(&[]);
        assert_eq!(report.metrics.total_distance, 0.0);
        assert_eq!(report.profile, MotorProfile::None);
        assert_eq!(report.confidence, 100.0);

        let report =
            PointerKinematicsAnalyzer::analyze(&trace(&[(0.0, 5.0, 5.0)]));
        assert_eq!(report.metrics.max_velocity, 0.0);
    }

    #[test]
    fn test_total_distance_and_velocity() {
        // Two segments of 3-4-5 triangles: 5 px each over 1 s each
        let samples = trace(&[(0.0, 0.0, 0.0), (1.0, 3.0, 4.0), (2.0, 6.0, 8.0)]);
        let report = PointerKinematicsAnalyzer::analyze(&samples);

        assert!((report.metrics.total_distance - 10.0).abs() < 1e-6);
        assert!((report.metrics.mean_velocity - 5.0).abs() < 1e-3);
        // Constant velocity: no acceleration, no variability
        assert!(report.metrics.velocity_std < 1e-3);
        assert!(report.metrics.max_acceleration < 1e-3);
    }

    #[test]
    fn test_direction_changes_count_reversals() {
        // Right, left, right: two reversals
        let samples = trace(&[
            (0.0, 0.0, 0.0),
            (0.1, 10.0, 0.0),
            (0.2, 0.0, 0.0),
            (0.3, 10.0, 0.0),
        ]);
        let report = PointerKinematicsAnalyzer::analyze(&samples);
        assert_eq!(report.metrics.direction_changes, 2);
    }

    #[test]
    fn test_calm_trace_has_no_profile() {
        let samples = trace(&[
            (0.0, 0.0, 0.0),
            (1.0, 20.0, 0.0),
            (2.0, 40.0, 0.0),
            (3.0, 60.0, 0.0),
        ]);
        let report = PointerKinematicsAnalyzer::analyze(&samples);
        assert_eq!(report.profile, MotorProfile::None);
        assert!(report.confidence > 0.0);
    }

    #[test]
    fn test_fast_spiky_trace_is_hyperactive() {
        // Large jumps in tiny time steps push max velocity and acceleration
        // past their elevated bounds without reversing direction
        let samples = trace(&[
            (0.00, 0.0, 0.0),
            (0.01, 30.0, 0.0),
            (0.02, 90.0, 0.0),
            (0.03, 95.0, 0.0),
        ]);
        let report = PointerKinematicsAnalyzer::analyze(&samples);
        assert_eq!(report.bands.max_velocity, Band::Elevated);
        assert!(matches!(
            report.profile,
            MotorProfile::Hyperactive | MotorProfile::Combined
        ));
        assert!(report.confidence >= 30.0);
    }

    #[test]
    fn test_erratic_reversals_mark_inattentive_component() {
        // Slow but constantly reversing pointer
        let mut points = Vec::new();
        for i in 0..30 {
            let x = if i % 2 == 0 { 0.0 } else { 4.0 };
            points.push((i as f64, x, 0.0));
        }
        let report = PointerKinematicsAnalyzer::analyze(&trace(&points));
        assert_eq!(report.bands.direction_changes, Band::Elevated);
        assert!(matches!(
            report.profile,
            MotorProfile::Inattentive | MotorProfile::Combined
        ));
    }

    #[test]
    fn test_confidence_capped_at_100() {
        let bands = KinematicsBands {
            total_distance: Band::Elevated,
            max_velocity: Band::Elevated,
            max_acceleration: Band::Elevated,
            velocity_std: Band::Elevated,
            acceleration_std: Band::Elevated,
            direction_changes: Band::Elevated,
        };
        let confidence = confidence_for(&bands, MotorProfile::Combined);
        assert_eq!(confidence, 100.0);
    }
}
