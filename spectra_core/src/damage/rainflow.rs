//! Rainflow cycle counting.
//!
//! The sequence is first reduced to its reversals (plateaus and points on a
//! monotonic run are dropped), then closed cycles are extracted with the
//! 4-point stack method. Whatever stays on the stack is the residue; each
//! residue range counts as a half cycle.
//!
//! Counting is order-sensitive: the same stresses in a different order give
//! different cycles.

use serde::{Deserialize, Serialize};

/// One counted cycle (or half cycle when `count` is 0.5)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub max: f64,
    pub min: f64,
    /// Number of occurrences, already multiplied by any flight weight
    pub count: f64,
}

impl Cycle {
    /// Cycle between two reversals, in either order
    pub fn between(a: f64, b: f64, count: f64) -> Self {
        Cycle {
            max: a.max(b),
            min: a.min(b),
            count,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn mean(&self) -> f64 {
        (self.max + self.min) / 2.0
    }

    pub fn amplitude(&self) -> f64 {
        self.range() / 2.0
    }
}

/// Turning points of a sequence
pub fn reversals(sequence: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(sequence.len());
    for &x in sequence {
        if out.last() == Some(&x) {
            continue;
        }
        let n = out.len();
        if n >= 2 && (out[n - 1] - out[n - 2]) * (x - out[n - 1]) > 0.0 {
            // still rising / falling: extend the run
            out[n - 1] = x;
            continue;
        }
        out.push(x);
    }
    out
}

/// Extract closed cycles and residue half cycles
pub fn count_cycles(sequence: &[f64]) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let mut stack: Vec<f64> = Vec::new();

    for point in reversals(sequence) {
        stack.push(point);
        while stack.len() >= 4 {
            let n = stack.len();
            let (s1, s2, s3, s4) = (stack[n - 4], stack[n - 3], stack[n - 2], stack[n - 1]);
            let inner = (s3 - s2).abs();
            if inner <= (s2 - s1).abs() && inner <= (s4 - s3).abs() {
                cycles.push(Cycle::between(s2, s3, 1.0));
                stack.drain(n - 3..n - 1);
            } else {
                break;
            }
        }
    }

    cycles.extend(stack.windows(2).map(|w| Cycle::between(w[0], w[1], 0.5)));
    cycles
}
