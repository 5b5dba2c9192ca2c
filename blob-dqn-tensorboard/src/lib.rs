//! TensorBoard recorder for blob-dqn.
use blob_dqn_core::record::{Record, RecordValue, Recorder};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    ignore_unsupported_value: bool,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            ignore_unsupported_value: true,
        }
    }

    /// Construct a [`TensorboardRecorder`] with checking unsupported record value.
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new_with_check_unsupported_value<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            ignore_unsupported_value: false,
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// This method handles [RecordValue::Scalar] and [RecordValue::DateTime] in the [Record].
    /// Other variants are ignored unless the recorder checks unsupported values.
    fn write(&mut self, step: usize, record: Record) {
        for (k, v) in record.iter() {
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::DateTime(_) => {} // discard value
                _ => {
                    if !self.ignore_unsupported_value {
                        panic!("Unsupported value: {:?}", (k, v));
                    }
                }
            };
        }
    }

    /// Hyperparameters are stored as `hparams/<name>` scalars at step 0.
    fn write_hparams(&mut self, hparams: &Record) {
        for (k, v) in hparams.iter() {
            match v {
                RecordValue::Scalar(v) => {
                    self.writer.add_scalar(&format!("hparams/{}", k), *v, 0)
                }
                _ => warn!("Hyperparameter {} is not a scalar, skipped", k),
            }
        }
        let _ = self.writer.flush();
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
