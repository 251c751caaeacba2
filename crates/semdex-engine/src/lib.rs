//! Session-scoped query engine.
//!
//! One [`SearchSession`] owns the chunk list, the vector index (or the
//! keyword fallback), and the embedding capability for one document at a
//! time. Sessions are independent values; concurrent sessions share no
//! state.

pub mod keyword;
mod session;

pub use session::{IndexStats, SearchSession};
