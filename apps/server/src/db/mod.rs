//! Database layer

pub mod memory;
pub mod store;
pub mod traits;

pub use memory::InMemoryStore;
pub use store::PostgresStore;
pub use traits::{ModuleRepository, UniversityRepository};
