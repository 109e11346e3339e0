//! On-chain interactions with the Lock contract

pub mod abi;
pub mod client;
pub mod reader;
pub mod sender;
