//! Contract compilation

pub mod solc;
