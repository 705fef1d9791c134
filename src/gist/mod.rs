// Gist resources.
// Lazy-loading gist handle, file set bookkeeping, upload protocol, and collection queries.

pub mod collection;
pub mod files;
pub mod resource;
pub mod upload;

pub use collection::Gists;
pub use files::FileSet;
pub use resource::Gist;
pub use upload::SaveOutcome;
