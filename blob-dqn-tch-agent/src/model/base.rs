//! Definition of interfaces of neural networks.
use anyhow::Result;
use tch::{nn, nn::VarStore, Tensor};

/// Base interface.
pub trait ModelBase {
    /// Trains the network given a loss.
    fn backward_step(&mut self, loss: &Tensor);

    /// Returns `var_store` as mutable reference.
    fn get_var_store_mut(&mut self) -> &mut nn::VarStore;

    /// Returns `var_store`.
    fn get_var_store(&self) -> &nn::VarStore;
}

/// Neural network model that can be initialized with [`VarStore`] and configuration.
///
/// Modules which make up a neural network share a [`VarStore`], so structs
/// implementing this trait are initialized with a given [`VarStore`].
/// Cloning with another [`VarStore`] is how target networks are created.
///
/// [`VarStore`]: https://docs.rs/tch/0.16.0/tch/nn/struct.VarStore.html
pub trait SubModel: Sized {
    /// Configuration from which [`SubModel`] is constructed.
    type Config;

    /// Input of the [`SubModel`].
    type Input;

    /// Output of the [`SubModel`].
    type Output;

    /// Builds [`SubModel`] with [`VarStore`] and [`SubModel::Config`].
    ///
    /// Fails when the configuration does not fix every layer shape.
    fn build(var_store: &VarStore, config: Self::Config) -> Result<Self>;

    /// Clones [`SubModel`] with [`VarStore`].
    ///
    /// The parameters are freshly initialized; copy them from the source
    /// [`VarStore`] afterwards.
    fn clone_with_var_store(&self, var_store: &VarStore) -> Self;

    /// A generalized forward function.
    fn forward(&self, input: &Self::Input) -> Self::Output;
}
