//! Service name constants keyed by provider display name.
//!
//! The constants are generated from `names_data.csv` by the `namesgen` binary
//! (`cargo run --features generate --bin namesgen`) and committed. Regenerate
//! after editing the CSV; the output is deterministic, so a clean regeneration
//! never produces a diff.

mod consts_gen;

pub use consts_gen::*;
