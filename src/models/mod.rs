//! Core data structures
//!
//! A [`HumdrumFile`] owns its lines and a token arena. Lines list their
//! fields as [`TokenId`]s; tokens link to each other by id, never by
//! ownership, so spine splits and merges form a plain index graph.

pub mod file;
pub mod line;
pub mod token;

pub use file::{AnalysisReport, HumdrumFile, Strand, TrackInfo};
pub use line::{Line, LineKind};
pub use token::{Address, Token, TokenId};
