//! Server-side chat storage.
//!
//! Provides:
//! - `ChatStorage` - Append-only, process-lifetime chat log (feature: memory)
//! - `NameGenerator` - Alliterative "adjective animal" usernames

pub mod names;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub use memory::ChatStorage;
pub use names::{NameError, NameGenerator};
