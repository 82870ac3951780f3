//! Structural analysis
//!
//! The passes that turn ingested lines into an analyzed file. They run in a
//! fixed order, each over the whole file before the next starts:
//!
//! ```text
//! lines → graph (links, tracks table) → tracks (track/subtrack ids)
//!       → strands (strand table) → rhythm (durations, timeline)
//! ```
//!
//! Later passes read the topology built by `graph` and never change it.
//! Every pass records problems as diagnostics and keeps going.

pub(crate) mod graph;
pub mod rhythm;
pub(crate) mod strands;
pub(crate) mod tracks;

pub use rhythm::Timeline;
