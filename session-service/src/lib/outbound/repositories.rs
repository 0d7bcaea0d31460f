pub mod in_memory;
pub mod user;

pub use in_memory::InMemoryUserDirectory;
pub use user::PostgresUserDirectory;
