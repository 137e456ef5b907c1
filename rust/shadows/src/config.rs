// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow build configuration, optionally loaded from environment variables.

/// Tunables for the shadow geometry builders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowConfig {
    /// Rotation (degrees) applied to the umbra-side ray of each fin, towards the umbra.
    pub seam_overlap_degrees: f64,
    /// Lower bound for `dot(lightToPointDir, rayDir)` when scaling a ray to the light range.
    pub min_projection_dot: f64,
    /// Sine tolerance under which a tangent ray counts as running along a hull edge.
    pub colinear_tolerance: f64,
    /// Minimum fin/hull overlap area that triggers clipping for occluded hulls.
    pub clip_area_threshold: f64,
    /// Rebuild dirty lights in parallel.
    pub parallel: bool,
}

impl ShadowConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seam_overlap_degrees: env_parse("UMBRA2D_SEAM_OVERLAP_DEGREES")
                .unwrap_or(defaults.seam_overlap_degrees),
            min_projection_dot: env_parse("UMBRA2D_MIN_PROJECTION_DOT")
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(defaults.min_projection_dot),
            colinear_tolerance: env_parse("UMBRA2D_COLINEAR_TOLERANCE")
                .unwrap_or(defaults.colinear_tolerance),
            clip_area_threshold: env_parse("UMBRA2D_CLIP_AREA_THRESHOLD")
                .unwrap_or(defaults.clip_area_threshold),
            parallel: std::env::var("UMBRA2D_PARALLEL")
                .ok()
                .map(|v| !matches!(v.trim(), "0" | "false" | "off"))
                .unwrap_or(defaults.parallel),
        }
    }

    /// Seam overlap rotation in radians.
    #[inline]
    pub fn seam_overlap_radians(&self) -> f64 {
        self.seam_overlap_degrees.to_radians()
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            seam_overlap_degrees: 0.1,
            min_projection_dot: 1e-3,
            colinear_tolerance: 1e-6,
            clip_area_threshold: 1e-6,
            parallel: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}
