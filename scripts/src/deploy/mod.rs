//! Contract deployment

#[allow(clippy::module_inception)]
pub mod deploy;
pub mod lock;
