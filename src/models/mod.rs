//! Wire and storage shapes for garbage reports.
//!
//! `Report` is the single persisted document; `Dispute` lives inside it.
//! Request types mirror the submission forms and JSON bodies the UI sends.

mod entities;
mod requests;

pub use entities::*;
pub use requests::*;
