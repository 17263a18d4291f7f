//! Identity provider implementations.

pub mod firebase;
pub mod memory;

pub use firebase::{FirebaseAuth, SessionStore, StoredSession};
pub use memory::MemoryProvider;
