//! Design matrices for regularized adjusted plus-minus (RAPM) regressions.
//!
//! Raw scoring events are normalized ([`normalize`]) into a row-ordered batch with
//! frozen side and player universes, then encoded ([`build_design`]) into a
//! response vector and two signed sparse indicator matrices.

pub mod columns;
pub mod config;
pub mod design;
pub mod error;
pub mod event;
pub mod event_store;
pub mod export;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod sparse;
pub mod synthetic;

pub use columns::{ColumnIndex, ColumnOrder};
pub use design::{BuildOptions, DesignMatrices, RosterConflictPolicy, build_design};
pub use error::DesignError;
pub use event::{PlayerId, RawEvent, Roster, SideCode, Strength};
pub use normalize::{EmptyBatchPolicy, NormalizeOptions, NormalizedBatch, SideUniverse, normalize};
pub use sparse::SignedCsrMatrix;
