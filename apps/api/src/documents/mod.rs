pub mod handlers;
pub mod repository;
pub mod store;

pub use repository::{HistoryFilter, PgArtifactRepository};
pub use store::DocumentStore;
