//! File storage implementations.

mod memory;

pub use memory::InMemoryFileStorage;
