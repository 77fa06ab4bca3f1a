//! Distance-based quality gating for remote entities.
//!
//! A pure function of squared planar distance; no square roots, no side
//! effects. Each gate has its own monotone threshold; ties at a boundary
//! resolve to the cheaper side. Callers query per entity per tick and
//! apply the result.

use crate::config::LodConfig;

/// Coarse tier label derived from the individual gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LodTier {
    /// Full-rate updates and all cosmetics.
    Full,
    /// Reduced rate, some cosmetics remain.
    Reduced,
    /// Transform-only.
    Minimal,
}

/// Per-entity quality decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LodDecision {
    /// Eligible for full-rate updates.
    pub full_rate: bool,
    /// Casts shadows.
    pub shadows: bool,
    /// Runs cosmetic/particle animation.
    pub particles: bool,
    /// Shows a nametag.
    pub nametag: bool,
    /// Shows the companion pet.
    pub pet: bool,
}

impl LodDecision {
    /// Number of enabled gates; useful as a cost ordering.
    #[inline]
    pub fn enabled_count(&self) -> u32 {
        self.full_rate as u32
            + self.shadows as u32
            + self.particles as u32
            + self.nametag as u32
            + self.pet as u32
    }

    /// Coarse tier for callers that want a single label.
    pub fn tier(&self) -> LodTier {
        if self.full_rate {
            LodTier::Full
        } else if self.shadows || self.particles || self.nametag || self.pet {
            LodTier::Reduced
        } else {
            LodTier::Minimal
        }
    }
}

/// Assess quality gates for an entity at `dist_sq` squared planar meters
/// from the local avatar.
///
/// Strict `<` so a distance exactly at a threshold takes the cheaper side.
#[inline]
pub fn assess(cfg: &LodConfig, dist_sq: f32) -> LodDecision {
    LodDecision {
        full_rate: dist_sq < cfg.full_rate_dist_sq,
        shadows: dist_sq < cfg.shadow_dist_sq,
        particles: dist_sq < cfg.particle_dist_sq,
        nametag: dist_sq < cfg.nametag_dist_sq,
        pet: dist_sq < cfg.pet_dist_sq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LodConfig {
        LodConfig::default()
    }

    #[test]
    fn gates_are_monotone_in_distance() {
        // For d1 < d2, every gate enabled at d2 is enabled at d1, so the
        // nearer entity is never cheaper.
        let cfg = cfg();
        let samples: Vec<f32> = (0..200).map(|i| i as f32 * 10.0).collect();
        for pair in samples.windows(2) {
            let near = assess(&cfg, pair[0]);
            let far = assess(&cfg, pair[1]);
            assert!(near.enabled_count() >= far.enabled_count());
            assert!(near.tier() <= far.tier());
            // Gate-wise: far enabled implies near enabled.
            assert!(near.full_rate || !far.full_rate);
            assert!(near.shadows || !far.shadows);
            assert!(near.particles || !far.particles);
            assert!(near.nametag || !far.nametag);
            assert!(near.pet || !far.pet);
        }
    }

    #[test]
    fn boundary_ties_resolve_to_the_cheaper_side() {
        let cfg = cfg();
        let at = assess(&cfg, cfg.full_rate_dist_sq);
        assert!(!at.full_rate);
        let just_inside = assess(&cfg, cfg.full_rate_dist_sq - 1.0e-3);
        assert!(just_inside.full_rate);
    }

    #[test]
    fn two_entities_scenario_from_thresholds() {
        // Entities at squared distances 100 and 10_000 with thresholds at
        // 50 and 5_000: the nearer entity is never lower-fidelity.
        let cfg = LodConfig {
            full_rate_dist_sq: 50.0,
            shadow_dist_sq: 5_000.0,
            particle_dist_sq: 5_000.0,
            nametag_dist_sq: 5_000.0,
            pet_dist_sq: 50.0,
        };
        let near = assess(&cfg, 100.0);
        let far = assess(&cfg, 10_000.0);
        assert!(near.enabled_count() >= far.enabled_count());
        assert_eq!(near.tier(), LodTier::Reduced);
        assert_eq!(far.tier(), LodTier::Minimal);
    }

    #[test]
    fn zero_distance_enables_everything() {
        let d = assess(&cfg(), 0.0);
        assert_eq!(d.enabled_count(), 5);
        assert_eq!(d.tier(), LodTier::Full);
    }
}
