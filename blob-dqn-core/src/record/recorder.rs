use super::Record;

/// Writes [`Record`]s to a metrics sink.
///
/// Every record is tagged with a step index. The training loop uses three
/// step axes: the step within the current episode, the episode index and the
/// number of optimization steps.
pub trait Recorder {
    /// Writes a record at the given step.
    fn write(&mut self, step: usize, record: Record);

    /// Writes run-level hyperparameters. Called once at startup.
    fn write_hparams(&mut self, hparams: &Record) {
        let _ = hparams;
    }

    /// Flushes buffered values to the sink.
    fn flush(&mut self) {}
}
