pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use snaplink_core::error::{Result, StorageError};
pub use snaplink_core::repository::{ReadRepository, Repository};
