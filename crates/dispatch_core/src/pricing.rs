//! Fare candidates for negotiation.
//!
//! A trip gets a "fair" price from the tier tariff, clamped to the configured
//! band, then three candidates around it: a discounted tier, the fair price,
//! and a premium tier. Every candidate rounds UP to the commercial step.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::session::{Fare, ServiceTier};

const DISCOUNT_FACTOR: f64 = 0.9;
const PREMIUM_FACTOR: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRate {
    pub base_fare: f64,
    pub per_km_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
pub struct TariffConfig {
    pub standard: TierRate,
    pub comfort: TierRate,
    pub premium: TierRate,
    /// Fares never leave this band, whatever the distance says.
    pub min_fare: Fare,
    pub max_fare: Fare,
    /// Commercial rounding step; candidates round up to a multiple of this.
    pub rounding_step: Fare,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            standard: TierRate {
                base_fare: 500.0,
                per_km_rate: 400.0,
            },
            comfort: TierRate {
                base_fare: 700.0,
                per_km_rate: 500.0,
            },
            premium: TierRate {
                base_fare: 1_000.0,
                per_km_rate: 650.0,
            },
            min_fare: 600,
            max_fare: 100_000,
            rounding_step: 50,
        }
    }
}

impl TariffConfig {
    pub fn rate_for(&self, tier: ServiceTier) -> TierRate {
        match tier {
            ServiceTier::Standard => self.standard,
            ServiceTier::Comfort => self.comfort,
            ServiceTier::Premium => self.premium,
        }
    }

    /// Base fare + per-km rate, clamped to the [min, max] band.
    pub fn fair_price(&self, distance_km: f64, tier: ServiceTier) -> f64 {
        let rate = self.rate_for(tier);
        let raw = rate.base_fare + distance_km * rate.per_km_rate;
        raw.clamp(self.min_fare as f64, self.max_fare as f64)
    }
}

fn round_up_to_step(amount: f64, step: Fare) -> Fare {
    let step = step.max(1);
    let units = (amount / step as f64).ceil() as Fare;
    units * step
}

/// The ordered candidate fares a driver may propose for this trip.
pub fn fare_candidates(distance_km: f64, tier: ServiceTier, tariff: &TariffConfig) -> Vec<Fare> {
    let fair = tariff.fair_price(distance_km, tier);
    let discounted = (fair * DISCOUNT_FACTOR).max(tariff.min_fare as f64);
    let premium = (fair * PREMIUM_FACTOR).min(tariff.max_fare as f64);

    let mut candidates = vec![
        round_up_to_step(discounted, tariff.rounding_step),
        round_up_to_step(fair, tariff.rounding_step),
        round_up_to_step(premium, tariff.rounding_step),
    ];
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ten_km_scenario() {
        let tariff = TariffConfig::default();
        // 500 base + 400/km * 10km = 4500 fair.
        assert_eq!(tariff.fair_price(10.0, ServiceTier::Standard), 4_500.0);
        // 4050 discounted, 4500 fair, 5175 premium rounded up to 5200.
        assert_eq!(
            fare_candidates(10.0, ServiceTier::Standard, &tariff),
            vec![4_050, 4_500, 5_200]
        );
    }

    #[test]
    fn candidates_are_ascending_and_deduplicated() {
        let tariff = TariffConfig {
            min_fare: 600,
            max_fare: 700,
            ..TariffConfig::default()
        };
        // The band squeezes everything onto the max.
        let candidates = fare_candidates(50.0, ServiceTier::Standard, &tariff);
        assert!(!candidates.is_empty());
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*candidates.last().expect("candidate"), 700);
    }

    #[test]
    fn short_trips_floor_at_the_minimum_fare() {
        let tariff = TariffConfig::default();
        let candidates = fare_candidates(0.1, ServiceTier::Standard, &tariff);
        assert!(candidates.iter().all(|&c| c >= tariff.min_fare));
    }

    #[test]
    fn rounding_is_always_upward() {
        assert_eq!(round_up_to_step(5_175.0, 50), 5_200);
        assert_eq!(round_up_to_step(5_200.0, 50), 5_200);
        assert_eq!(round_up_to_step(5_201.0, 50), 5_250);
    }

    #[test]
    fn higher_tiers_cost_more() {
        let tariff = TariffConfig::default();
        let standard = tariff.fair_price(8.0, ServiceTier::Standard);
        let comfort = tariff.fair_price(8.0, ServiceTier::Comfort);
        let premium = tariff.fair_price(8.0, ServiceTier::Premium);
        assert!(standard < comfort && comfort < premium);
    }
}
