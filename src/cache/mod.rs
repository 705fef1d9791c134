// In-memory caching for gist resources.
// Per-instance lazy slots; nothing is shared across instances or persisted.

pub mod lazy;

pub use lazy::Lazy;
