//! The note-store side of the system, as far as the engine needs it.
//!
//! Notes themselves are owned by an external store; the engine only needs to
//! enumerate them and read current content, which [`MemorySource`] captures.

pub mod source;
pub mod types;

pub use source::{MemoryDir, MemorySource};
pub use types::{MemoryRecord, MemoryType};
