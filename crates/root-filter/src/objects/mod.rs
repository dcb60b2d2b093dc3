//! ROOT object deserialization: histograms and trees.

pub mod th1;
pub mod ttree;
