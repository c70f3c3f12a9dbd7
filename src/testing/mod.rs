//! Test support, compiled for unit tests and behind the `test-utils` feature.

mod memory;

pub use memory::MemoryStore;
