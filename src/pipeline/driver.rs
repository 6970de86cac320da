use super::*;
use crate::Config;
use crate::Failure;
use crate::embedding::Backbone;
use crate::embedding::VectorExtractor;
use crate::filter::Disk;
use crate::filter::Probe;
use crate::filter::SizeFilter;
use crate::imagery::Layout;
use crate::imagery::Panorama;
use crate::imagery::Unit;
use crate::imagery::Units;
use crate::results::Accumulator;
use crate::sampling::Outcome;
use crate::sampling::UnitSampler;
use std::path::Path;

/// Walks spatial units one at a time in ascending id order.
///
/// Each sampled unit is checkpointed before its images are copied and
/// before the next unit starts, so the snapshot always reflects a prefix
/// of the run. Per-unit skips and per-file copy failures never stop the
/// run, and neither does a failed checkpoint.
pub struct Pipeline<B, P = Disk> {
    sampler: UnitSampler<B, P>,
    results: Accumulator,
}

impl Pipeline<Box<dyn Backbone>, Disk> {
    /// Loads the backbone once and opens (or resumes) the snapshot.
    pub fn from_config(config: &Config) -> Result<Self, Failure> {
        let backbone = crate::embedding::load(config)?;
        log::info!("{:<32}{:<32}", "backbone", format!("{} ({} wide)", config.family, backbone.width()));
        let extractor = VectorExtractor::new(backbone, config.workers)?;
        let sampler = UnitSampler::new(SizeFilter::new(config), extractor, config);
        let ref snapshot = config.snapshot();
        let results = match config.resume {
            true => Accumulator::resume(snapshot, config.raw)?,
            false => {
                if snapshot.exists() {
                    log::warn!("{:<32}{}", "overwriting snapshot", snapshot.display());
                }
                Accumulator::new(snapshot, config.raw)
            }
        };
        Ok(Self::new(sampler, results))
    }
}

impl<B: Backbone, P: Probe> Pipeline<B, P> {
    pub fn new(sampler: UnitSampler<B, P>, results: Accumulator) -> Self {
        Self { sampler, results }
    }

    pub fn results(&self) -> &Accumulator {
        &self.results
    }

    /// Samples every unit not already in the snapshot.
    ///
    /// Units already in the snapshot only get their missing copies
    /// restored. A failed checkpoint is recorded and retried on the next
    /// append, and once more before returning.
    pub fn run(&mut self, units: &[Unit]) -> Result<Summary, Failure> {
        let mut order = units.iter().collect::<Vec<&Unit>>();
        order.sort_by(|a, b| a.id().cmp(b.id()));
        let total = order.len();
        let mut summary = Summary::default();
        for (i, unit) in order.into_iter().enumerate() {
            if crate::interrupted() {
                summary.interrupted = true;
                break;
            }
            log::info!("{:<32}{:<32}", format!("unit {}/{}", i + 1, total), unit.id());
            if self.results.contains(unit.id()) {
                log::info!("{:<32}{:<32}", "already in snapshot", unit.id());
                summary.resumed += 1;
                self.restore(unit.id(), &mut summary);
                continue;
            }
            match self.sampler.sample(unit) {
                Outcome::Unusable { candidates } => {
                    log::warn!("{:<32}{} usable of {} in {}", "unusable unit", candidates, unit.len(), unit.id());
                    summary.unusable += 1;
                }
                Outcome::Failed { failure } => {
                    log::warn!("{:<32}{}: {}", "abandoned unit", unit.id(), failure);
                    summary.failed += 1;
                }
                Outcome::Sampled { samples, clamped } => {
                    summary.rows += samples.len();
                    summary.sampled += 1;
                    summary.clamped += clamped as usize;
                    if let Err(e) = self.results.append(unit.id(), &samples) {
                        log::warn!("{}", e);
                        summary.snapshot_failures.push(e);
                    }
                    for sample in samples.iter() {
                        Self::copy(sample.record.source(), sample.record.destination(), &mut summary);
                    }
                    log::info!("{:<32}{:<32}", "representatives", samples.len());
                }
            }
        }
        if let Err(e) = self.results.flush() {
            log::error!("{}", e);
            summary.snapshot_failures.push(e);
        }
        Ok(summary)
    }

    /// Copies the snapshot rows of a finished unit whose destination is absent.
    fn restore(&self, unit: &str, summary: &mut Summary) {
        self.results
            .rows_of(unit)
            .filter(|row| !row.destination.exists())
            .for_each(|row| Self::copy(&row.source, &row.destination, summary));
    }

    fn copy(from: &Path, into: &Path, summary: &mut Summary) {
        match transfer(from, into) {
            Ok(_) => summary.copied += 1,
            Err(e) => {
                log::warn!("{}", e);
                summary.copy_failures.push(e);
            }
        }
    }
}

/// Groups panoramas into units under the configured layout and runs them all.
pub fn summarize(config: &Config, panoramas: Vec<Panorama>) -> Result<Summary, Failure> {
    let units = Units::from(panoramas);
    log::info!("{:<32}{:<32}", "spatial units", units.len());
    let units = units.expand(&Layout::from(config));
    let mut pipeline = Pipeline::from_config(config)?;
    let summary = pipeline.run(&units)?;
    summary.log();
    Ok(summary)
}
