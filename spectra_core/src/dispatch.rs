//! # Dispatch
//!
//! Bounded worker pools for running batches. Two `rayon` pools cap the
//! number of analyses and of sub-analyses (contributions, angles) running at
//! once. A [`CancellationToken`] is checked before each unit starts; units
//! that never started report [`FatigueError::Cancelled`] while running ones
//! finish normally.
//!
//! ## Example
//!
//! ```rust
//! use spectra_core::analysis::UnitRunner;
//! use spectra_core::dispatch::Dispatcher;
//! use spectra_core::settings::EngineSettings;
//!
//! let dispatcher = Dispatcher::new(&EngineSettings::default()).unwrap();
//! let squares = dispatcher.subunits().run_units(4, |i| Ok(i * i));
//! assert_eq!(squares[3], Ok(9));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::analysis::{AnalysisContext, UnitRunner};
use crate::batch::{AnalysisBatch, BatchReport};
use crate::errors::{FatigueError, FatigueResult};
use crate::settings::EngineSettings;
use crate::spectrum::Spectrum;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// [`UnitRunner`] backed by one rayon pool
pub struct PoolRunner<'a> {
    pool: &'a ThreadPool,
    token: &'a CancellationToken,
    name: &'static str,
}

impl UnitRunner for PoolRunner<'_> {
    fn run_units<T, F>(&self, count: usize, unit: F) -> Vec<FatigueResult<T>>
    where
        T: Send,
        F: Fn(usize) -> FatigueResult<T> + Sync + Send,
    {
        self.pool.install(|| {
            (0..count)
                .into_par_iter()
                .map(|index| {
                    if self.token.is_cancelled() {
                        Err(FatigueError::cancelled(format!("{} {}", self.name, index)))
                    } else {
                        unit(index)
                    }
                })
                .collect()
        })
    }
}

/// Two bounded pools plus a cancellation token
pub struct Dispatcher {
    analyses: ThreadPool,
    subanalyses: ThreadPool,
    token: CancellationToken,
}

impl Dispatcher {
    pub fn new(settings: &EngineSettings) -> FatigueResult<Self> {
        settings.validate()?;
        Ok(Dispatcher {
            analyses: build_pool(settings.max_parallel_analyses, "spectra-analysis")?,
            subanalyses: build_pool(settings.max_parallel_subanalyses, "spectra-unit")?,
            token: CancellationToken::new(),
        })
    }

    /// Use an externally owned token (builder pattern)
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        tracing::warn!("cancellation requested");
        self.token.cancel();
    }

    /// Runner for whole analyses
    pub fn analyses(&self) -> PoolRunner<'_> {
        PoolRunner {
            pool: &self.analyses,
            token: &self.token,
            name: "analysis",
        }
    }

    /// Runner for the units inside one analysis
    pub fn subunits(&self) -> PoolRunner<'_> {
        PoolRunner {
            pool: &self.subanalyses,
            token: &self.token,
            name: "unit",
        }
    }

    pub fn run_batch(&self, batch: &AnalysisBatch, spectrum: &Spectrum, context: &AnalysisContext<'_>) -> BatchReport {
        batch.run(spectrum, context, &self.analyses(), &self.subunits())
    }
}

fn build_pool(threads: usize, prefix: &'static str) -> FatigueResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("{}-{}", prefix, i))
        .build()
        .map_err(|e| FatigueError::Internal {
            message: format!("failed to build {} pool: {}", prefix, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{fixtures, AnalysisItem, EquivalentStressInput, Sequential};

    fn settings(analyses: usize, units: usize) -> EngineSettings {
        EngineSettings {
            max_parallel_analyses: analyses,
            max_parallel_subanalyses: units,
            ..Default::default()
        }
    }

    #[test]
    fn test_results_keep_unit_order() {
        let dispatcher = Dispatcher::new(&settings(2, 3)).unwrap();
        let out = dispatcher.subunits().run_units(50, |i| Ok(i as u64 * 2));
        let values: Vec<u64> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, (0..50).map(|i| i * 2).collect::<Vec<u64>>());
    }

    #[test]
    fn test_cancelled_units_report_cancelled() {
        let dispatcher = Dispatcher::new(&settings(1, 2)).unwrap();
        dispatcher.cancel();
        let out = dispatcher.subunits().run_units(3, |i| Ok(i));
        assert!(out.iter().all(|r| matches!(r, Err(FatigueError::Cancelled { .. }))));
        assert!(out[0].as_ref().unwrap_err().is_recoverable());
    }

    #[test]
    fn test_shared_token() {
        let token = CancellationToken::new();
        let dispatcher = Dispatcher::new(&settings(1, 1)).unwrap().with_token(token.clone());
        assert!(!dispatcher.token().is_cancelled());
        token.cancel();
        assert!(dispatcher.token().is_cancelled());
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(Dispatcher::new(&settings(0, 1)).is_err());
    }

    #[test]
    fn test_batch_matches_sequential_run() {
        let lib = fixtures::library();
        let ctx = AnalysisContext::new(&lib, "tester");
        let spectrum = fixtures::spectrum();
        let mut batch = AnalysisBatch::new("A", "C");
        for label in ["one", "two", "three"] {
            batch.add_item(AnalysisItem::EquivalentStress(EquivalentStressInput::new(label, fixtures::material())));
        }

        let parallel = Dispatcher::new(&settings(2, 2)).unwrap().run_batch(&batch, &spectrum, &ctx);
        let sequential = batch.run(&spectrum, &ctx, &Sequential, &Sequential);
        let damage = |report: &BatchReport| -> Vec<Option<f64>> {
            report
                .entries
                .iter()
                .map(|e| match &e.outcome {
                    Some(crate::analysis::AnalysisOutcome::EquivalentStress(r)) => Some(r.damage),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(damage(&parallel), damage(&sequential));
        assert_eq!(parallel.failed_count(), 0);
    }
}
