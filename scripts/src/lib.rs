//! Scripts for building, deploying and verifying the Lock contract.
#![cfg_attr(not(test), deny(clippy::missing_docs_in_private_items))]

pub mod artifact;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod units;
pub mod utils;

/// Our build utils
pub mod build;

/// Our deploy utils
pub mod deploy;

/// Our output utils
mod output_writer;

pub mod tx;

/// Our explorer utils
pub mod verify;
