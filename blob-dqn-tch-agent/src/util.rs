//! Utilities.
mod named_tensors;
use log::trace;
pub use named_tensors::NamedTensors;
use tch::nn::VarStore;

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &mut VarStore, src: &VarStore, tau: f64) {
    let src = src.variables();
    let mut dest = dest.variables();
    debug_assert_eq!(src.len(), dest.len());

    tch::no_grad(|| {
        for (name, dest) in dest.iter_mut() {
            if let Some(src) = src.get(name) {
                dest.copy_(&(tau * src + (1.0 - tau) * &*dest));
            }
        }
    });
    trace!("soft update");
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;

    /// Sets the  output dimension.
    fn set_out_dim(&mut self, v: i64);
}
