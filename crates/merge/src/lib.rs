//! `qekit-merge`: N-way keyed table merge engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns a merged table.
//! No CLI dependencies; file access is limited to parsing CSV text handed in
//! by the caller.

pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod join;
pub mod model;
pub mod table;
pub mod value;

pub use config::MergeConfig;
pub use engine::{merge_tables, run, MergePlan};
pub use error::MergeError;
pub use join::{merge_pair, CollisionPolicy, JoinKey, JoinPolicy};
pub use model::{MergeInput, MergeResult};
pub use table::Table;
pub use value::Value;
