//! Persisted calibration profile: the fitted model parameters, the fit
//! quality metric, and the area-of-interest polygon, keyed by a profile
//! name. Where the bytes live is the storage layer's concern; this module
//! only defines the record and its JSON round-trip.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gaze_calib::FittedParams;
use gaze_core::{AreaOfInterest, Real};

pub const PROFILE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("unsupported profile schema version {found} (newest supported is {supported})")]
    SchemaVersion { found: u32, supported: u32 },
    #[error("malformed profile: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One person's reusable calibration, as stored between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub schema_version: u32,
    pub profile_name: String,
    /// Unix seconds when the profile was created.
    pub created_at: u64,
    pub model: FittedParams,
    /// RMS training residual of the fit, in normalized screen units.
    pub rms_error: Real,
    pub aoi: AreaOfInterest,
}

impl CalibrationProfile {
    pub fn new(
        profile_name: impl Into<String>,
        model: FittedParams,
        rms_error: Real,
        aoi: AreaOfInterest,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            schema_version: PROFILE_SCHEMA_VERSION,
            profile_name: profile_name.into(),
            created_at,
            model,
            rms_error,
            aoi,
        }
    }

    /// Whether the operator should be warned about fit quality.
    pub fn exceeds_rms_warn(&self, threshold: Real) -> bool {
        self.rms_error > threshold
    }

    pub fn to_json(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a stored profile. Newer schema versions are
    /// refused instead of misread.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(json)?;
        if profile.schema_version > PROFILE_SCHEMA_VERSION {
            return Err(ProfileError::SchemaVersion {
                found: profile.schema_version,
                supported: PROFILE_SCHEMA_VERSION,
            });
        }
        Ok(profile)
    }

    /// Short content hash recorded into session metadata so a session can
    /// be traced to the exact calibration it ran under. Detects drift
    /// only; this is not an integrity check.
    pub fn content_hash(&self) -> String {
        let mut h = Hasher::new(self.schema_version as u64);
        h.write_bytes(self.profile_name.as_bytes());
        h.write(self.created_at);
        h.write(self.model.degree as u64);
        h.write_f64(self.model.lambda);
        h.write(self.model.feature_len as u64);
        for &v in self
            .model
            .feature_means
            .iter()
            .chain(self.model.feature_scales.iter())
            .chain(self.model.x_axis.coefficients.iter())
            .chain(self.model.y_axis.coefficients.iter())
        {
            h.write_f64(v);
        }
        h.write_f64(self.model.x_axis.intercept);
        h.write_f64(self.model.y_axis.intercept);
        h.write_f64(self.rms_error);
        for v in self.aoi.vertices() {
            h.write_f64(v.x);
            h.write_f64(v.y);
        }
        format!("{:016x}", h.finish())
    }
}

/// SplitMix64-based fold over the profile content.
struct Hasher(u64);

impl Hasher {
    fn new(seed: u64) -> Self {
        Self(seed ^ 0x9E37_79B9_7F4A_7C15)
    }

    fn write(&mut self, v: u64) {
        let mut z = self.0 ^ v;
        z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        self.0 = z ^ (z >> 31);
    }

    fn write_f64(&mut self, v: Real) {
        self.write(v.to_bits());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.write(bytes.len() as u64);
        for chunk in bytes.chunks(8) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            self.write(u64::from_le_bytes(buf));
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_calib::{calibration_grid, CalibrationSample, GazeMapper};
    use gaze_core::synthetic::synthetic_observation;
    use gaze_core::{extract_features, Pt2};

    fn fitted_params() -> (FittedParams, Real) {
        let samples: Vec<CalibrationSample> = calibration_grid()
            .into_iter()
            .map(|target| CalibrationSample {
                features: extract_features(&synthetic_observation(target)).unwrap(),
                target,
                observation_count: 1,
            })
            .collect();
        let mut mapper = GazeMapper::new(2, 1.0);
        let rms = mapper.fit(&samples).unwrap();
        (mapper.to_params().unwrap(), rms)
    }

    fn square_aoi() -> AreaOfInterest {
        AreaOfInterest::new(vec![
            Pt2::new(0.1, 0.1),
            Pt2::new(0.9, 0.1),
            Pt2::new(0.9, 0.9),
            Pt2::new(0.1, 0.9),
        ])
    }

    #[test]
    fn json_roundtrip() {
        let (params, rms) = fitted_params();
        let profile = CalibrationProfile::new("default", params, rms, square_aoi());
        let json = profile.to_json().unwrap();
        let back = CalibrationProfile::from_json(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn newer_schema_is_refused() {
        let (params, rms) = fitted_params();
        let mut profile = CalibrationProfile::new("default", params, rms, square_aoi());
        profile.schema_version = PROFILE_SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&profile).unwrap();
        assert!(matches!(
            CalibrationProfile::from_json(&json),
            Err(ProfileError::SchemaVersion { .. })
        ));
    }

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        let (params, rms) = fitted_params();
        let profile = CalibrationProfile::new("default", params, rms, square_aoi());
        let h1 = profile.content_hash();
        assert_eq!(h1.len(), 16);
        assert_eq!(h1, profile.content_hash());

        let mut other = profile.clone();
        other.rms_error += 1e-9;
        assert_ne!(h1, other.content_hash());

        let mut renamed = profile.clone();
        renamed.profile_name = "alternate".into();
        assert_ne!(h1, renamed.content_hash());
    }

    #[test]
    fn rms_warn_gate() {
        let (params, _) = fitted_params();
        let profile = CalibrationProfile::new("default", params, 0.08, square_aoi());
        assert!(profile.exceeds_rms_warn(0.05));
        assert!(!profile.exceeds_rms_warn(0.10));
    }
}
