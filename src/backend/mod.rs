pub mod local;
pub mod preview_cache;
pub mod trash;

pub use local::LocalBackend;
