use crate::Failure;

/// What a run did, reported once at the end.
#[derive(Debug, Default)]
pub struct Summary {
    /// Units that produced representatives.
    pub sampled: usize,
    /// Units below the usable minimum.
    pub unusable: usize,
    /// Units abandoned on an embedding failure.
    pub failed: usize,
    /// Units skipped because the resumed snapshot already had them.
    pub resumed: usize,
    /// Sampled units whose k was clamped to their candidate count.
    pub clamped: usize,
    /// Rows appended to the snapshot by this run.
    pub rows: usize,
    /// Representatives copied into place, including ones restored for
    /// resumed units whose destinations were missing.
    pub copied: usize,
    pub copy_failures: Vec<Failure>,
    /// Checkpoints that could not be written; later ones carry their rows.
    pub snapshot_failures: Vec<Failure>,
    /// Whether the run stopped early on request.
    pub interrupted: bool,
}

impl Summary {
    /// Units this run looked at, skipped or not.
    pub fn units(&self) -> usize {
        self.sampled + self.unusable + self.failed + self.resumed
    }

    pub fn log(&self) {
        log::info!("{:<32}{:<32}", "units sampled", self.sampled);
        log::info!("{:<32}{:<32}", "units unusable", self.unusable);
        log::info!("{:<32}{:<32}", "units failed", self.failed);
        log::info!("{:<32}{:<32}", "units resumed", self.resumed);
        log::info!("{:<32}{:<32}", "units clamped", self.clamped);
        log::info!("{:<32}{:<32}", "rows written", self.rows);
        log::info!("{:<32}{:<32}", "images copied", self.copied);
        if !self.copy_failures.is_empty() {
            log::warn!("{:<32}{:<32}", "copy failures", self.copy_failures.len());
            self.copy_failures.iter().for_each(|e| log::warn!("{}", e));
        }
        if !self.snapshot_failures.is_empty() {
            log::warn!("{:<32}{:<32}", "snapshot failures", self.snapshot_failures.len());
        }
        if self.interrupted {
            log::warn!("run interrupted before the last unit");
        }
    }
}
