//! Database repositories for Taskboard
//!
//! Repositories encapsulate data access logic and provide a clean API for
//! business logic to interact with the database.

pub mod task;
pub mod user;

pub use task::{TaskRepository, TaskRepositoryError};
pub use user::{UserRepository, UserRepositoryError};
