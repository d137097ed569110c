//! Damage accumulation and equivalent stress.
//!
//! All three damage models sum a per-cycle quantity that is a power of a
//! per-cycle stress measure `x` (Walker amplitude for fatigue, effective
//! range for propagation):
//!
//! ```text
//! D   = Σ n·k·x^e
//! σeq = (Σ n·x^e / Σ n)^(1/e)
//! ```
//!
//! so the equivalent stress is the constant level that gives the same damage
//! over the same number of cycles. With no cycles left after omission the
//! damage is 0 and the equivalent stress is undefined (`None`).

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::rainflow::{count_cycles, Cycle};
use crate::materials::{FatigueMaterial, Material, PropagationMaterial};

/// Accumulated damage of a sequence (or a weighted set of sequences)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageSummary {
    /// Miner damage (fatigue) or crack growth (propagation)
    pub damage: f64,
    /// Constant-amplitude equivalent; `None` when no cycle was counted
    pub equivalent_stress: Option<f64>,
    /// Weighted number of cycles that took part
    pub cycle_count: f64,
}

/// Collects weighted cycles and evaluates them against one material
#[derive(Debug, Clone)]
pub struct DamageAccumulator<'m> {
    material: &'m Material,
    omission_level: Option<f64>,
    cycles: Vec<Cycle>,
}

impl<'m> DamageAccumulator<'m> {
    /// `omission_level` is only used when `apply_omission` is set
    pub fn new(material: &'m Material, omission_level: f64, apply_omission: bool) -> Self {
        DamageAccumulator {
            material,
            omission_level: apply_omission.then_some(omission_level),
            cycles: Vec::new(),
        }
    }

    /// Rainflow-count a sequence and keep its cycles with the given weight
    pub fn add_sequence(&mut self, sequence: &[f64], weight: f64) {
        let before = self.cycles.len();
        for mut cycle in count_cycles(sequence) {
            cycle.count *= weight;
            self.add_cycle(cycle);
        }
        trace!(peaks = sequence.len(), cycles = self.cycles.len() - before, weight, "sequence counted");
    }

    /// Add an already counted cycle
    pub fn add_cycle(&mut self, cycle: Cycle) {
        self.cycles.push(cycle);
    }

    fn is_kept(&self, cycle: &Cycle) -> bool {
        match self.omission_level {
            Some(level) => cycle.range() >= level,
            None => true,
        }
    }

    /// Evaluate the collected cycles
    pub fn finish(&self) -> DamageSummary {
        match self.material {
            Material::Fatigue(m) => self.fatigue(m),
            Material::LinearPropagation(m) => {
                self.propagation(m, |c| match PropagationMaterial::stress_ratio(c.max, c.min) {
                    Some(r) => m.closure(r) * c.range(),
                    None => 0.0,
                })
            }
            Material::Preffas(m) => {
                let opening = self.opening_level(m);
                self.propagation(m, |c| match opening {
                    Some(op) if c.max > 0.0 => (c.max - op.max(c.min)).max(0.0),
                    _ => 0.0,
                })
            }
        }
    }

    fn fatigue(&self, m: &FatigueMaterial) -> DamageSummary {
        let mut damage = 0.0;
        let mut sum_pow = 0.0;
        let mut n = 0.0;
        for c in self.cycles.iter().filter(|c| self.is_kept(c)) {
            let s_eq = m.equivalent_amplitude(c.max, c.min);
            damage += c.count * m.damage_per_cycle(s_eq);
            sum_pow += c.count * s_eq.powf(m.slope);
            n += c.count;
        }
        summarize(damage, sum_pow, n, m.slope)
    }

    fn propagation(&self, m: &PropagationMaterial, effective_range: impl Fn(&Cycle) -> f64) -> DamageSummary {
        let mut damage = 0.0;
        let mut sum_pow = 0.0;
        let mut n = 0.0;
        for c in self.cycles.iter().filter(|c| self.is_kept(c)) {
            let range_eff = effective_range(c);
            damage += c.count * m.growth_per_cycle(range_eff);
            sum_pow += c.count * range_eff.max(0.0).powf(m.m);
            n += c.count;
        }
        summarize(damage, sum_pow, n, m.m)
    }

    /// Opening level of the most severe cycle, over all cycles before omission
    fn opening_level(&self, m: &PropagationMaterial) -> Option<f64> {
        self.cycles
            .iter()
            .filter(|c| c.count > 0.0)
            .filter_map(|c| {
                PropagationMaterial::stress_ratio(c.max, c.min).map(|r| c.max - m.closure(r) * c.range())
            })
            .reduce(f64::max)
    }
}

fn summarize(damage: f64, sum_pow: f64, n: f64, exponent: f64) -> DamageSummary {
    if n <= 0.0 {
        return DamageSummary::default();
    }
    DamageSummary {
        damage,
        equivalent_stress: Some((sum_pow / n).powf(1.0 / exponent)),
        cycle_count: n,
    }
}

/// Damage of a single sequence
pub fn accumulate(sequence: &[f64], material: &Material, omission_level: f64, apply_omission: bool) -> DamageSummary {
    let mut acc = DamageAccumulator::new(material, omission_level, apply_omission);
    acc.add_sequence(sequence, 1.0);
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fatigue() -> Material {
        Material::Fatigue(FatigueMaterial {
            name: "AL".to_string(),
            specification: String::new(),
            slope: 4.0,
            mean_stress_exponent: 0.5,
            reference_stress: 100.0,
            reference_cycles: 1.0e6,
        })
    }

    fn propagation(preffas: bool) -> Material {
        let m = PropagationMaterial {
            name: "AL".to_string(),
            specification: String::new(),
            ceff: 1.0e-10,
            m: 3.0,
            a: 0.5,
            b: 0.5,
            c: 0.0,
        };
        if preffas {
            Material::Preffas(m)
        } else {
            Material::LinearPropagation(m)
        }
    }

    #[test]
    fn test_empty_sequence_undefined() {
        let summary = accumulate(&[], &fatigue(), 0.0, false);
        assert_eq!(summary.damage, 0.0);
        assert_eq!(summary.equivalent_stress, None);
    }

    #[test]
    fn test_fully_reversed_reference_cycle() {
        // One full cycle 100/-100: σeq = 100 → d = 1e-6
        let summary = accumulate(&[-100.0, 100.0, -100.0], &fatigue(), 0.0, false);
        assert!((summary.damage - 1.0e-6).abs() < 1e-15);
        assert!((summary.equivalent_stress.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(summary.cycle_count, 1.0);
    }

    #[test]
    fn test_equivalent_stress_reproduces_damage() {
        let seq = [0.0, 120.0, 20.0, 90.0, -30.0, 150.0, 0.0];
        let material = fatigue();
        let summary = accumulate(&seq, &material, 0.0, false);
        let Material::Fatigue(m) = &material else { unreachable!() };
        let rebuilt = summary.cycle_count * m.damage_per_cycle(summary.equivalent_stress.unwrap());
        assert!((rebuilt - summary.damage).abs() < 1e-12 * summary.damage.max(1.0));
    }

    #[test]
    fn test_omission_drops_small_cycles() {
        let seq = [0.0, 100.0, 95.0, 100.0, 0.0];
        let all = accumulate(&seq, &fatigue(), 10.0, false);
        let omitted = accumulate(&seq, &fatigue(), 10.0, true);
        assert!(omitted.cycle_count < all.cycle_count);
        assert!(omitted.damage <= all.damage);

        let everything = accumulate(&seq, &fatigue(), 1.0e6, true);
        assert_eq!(everything.damage, 0.0);
        assert_eq!(everything.equivalent_stress, None);
    }

    #[test]
    fn test_weighting() {
        let material = fatigue();
        let mut single = DamageAccumulator::new(&material, 0.0, false);
        single.add_sequence(&[-100.0, 100.0, -100.0], 1.0);
        let mut weighted = DamageAccumulator::new(&material, 0.0, false);
        weighted.add_sequence(&[-100.0, 100.0, -100.0], 250.0);
        let (a, b) = (single.finish(), weighted.finish());
        assert!((b.damage - 250.0 * a.damage).abs() < 1e-12);
        assert_eq!(a.equivalent_stress, b.equivalent_stress);
    }

    #[test]
    fn test_linear_propagation_zero_based() {
        // R = 0 → U = 0.5 → Δeff = 50
        let summary = accumulate(&[0.0, 100.0, 0.0], &propagation(false), 0.0, false);
        assert!((summary.equivalent_stress.unwrap() - 50.0).abs() < 1e-9);
        assert!((summary.damage - 1.0e-10 * 50.0_f64.powi(3)).abs() < 1e-15);
    }

    #[test]
    fn test_preffas_opening_from_severe_cycle() {
        // Severe cycle 0/200 opens at 100; the 0/120 cycle only sees 20
        let material = propagation(true);
        let mut acc = DamageAccumulator::new(&material, 0.0, false);
        acc.add_cycle(Cycle::between(0.0, 200.0, 1.0));
        acc.add_cycle(Cycle::between(0.0, 120.0, 1.0));
        let summary = acc.finish();
        let expected = 1.0e-10 * (100.0_f64.powi(3) + 20.0_f64.powi(3));
        assert!((summary.damage - expected).abs() < 1e-15);
    }

    #[test]
    fn test_compressive_sequence_defined_but_zero() {
        let summary = accumulate(&[-10.0, -100.0, -10.0], &fatigue(), 0.0, false);
        assert_eq!(summary.damage, 0.0);
        assert_eq!(summary.equivalent_stress, Some(0.0));
    }
}
