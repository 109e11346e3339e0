//! Source verification on block explorers

pub mod explorer;
