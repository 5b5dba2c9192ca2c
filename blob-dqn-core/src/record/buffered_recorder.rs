use super::{Record, Recorder};

/// Keeps written records in memory.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<(usize, Record)>,
    hparams: Option<Record>,
}

impl BufferedRecorder {
    /// Constructs a [`BufferedRecorder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records with their step indices.
    pub fn iter(&self) -> std::slice::Iter<(usize, Record)> {
        self.buf.iter()
    }

    /// Returns the hyperparameters, if written.
    pub fn hparams(&self) -> Option<&Record> {
        self.hparams.as_ref()
    }

    /// Returns `(step, value)` pairs of the scalar stored under `key`.
    pub fn scalars(&self, key: &str) -> Vec<(usize, f32)> {
        self.buf
            .iter()
            .filter_map(|(step, record)| record.get_scalar(key).ok().map(|v| (*step, v)))
            .collect()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, step: usize, record: Record) {
        self.buf.push((step, record));
    }

    fn write_hparams(&mut self, hparams: &Record) {
        self.hparams = Some(hparams.clone());
    }
}
