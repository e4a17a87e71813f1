pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{DatabaseError, PgPool, create_pool, run_migrations};
pub use repositories::{PgDocumentRepository, PgVectorIndex};
