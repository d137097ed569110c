//! Fan-out seam between the analyses and whatever schedules their units.

use crate::errors::FatigueResult;

/// Runs `count` independent units and returns their outcomes in unit order.
///
/// Implementations may run units concurrently; a unit never observes
/// another unit's state. A unit that is not run reports its own error in
/// its slot instead of failing the whole fan-out.
pub trait UnitRunner: Sync {
    fn run_units<T, F>(&self, count: usize, unit: F) -> Vec<FatigueResult<T>>
    where
        T: Send,
        F: Fn(usize) -> FatigueResult<T> + Sync + Send;
}

/// Runs every unit on the calling thread, in order
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl UnitRunner for Sequential {
    fn run_units<T, F>(&self, count: usize, unit: F) -> Vec<FatigueResult<T>>
    where
        T: Send,
        F: Fn(usize) -> FatigueResult<T> + Sync + Send,
    {
        (0..count).map(unit).collect()
    }
}
