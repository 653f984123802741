//! Task module for Taskboard
//!
//! REST API endpoints for per-user Kanban task CRUD, gated by the session
//! gateway and the ownership guard.

pub mod api;

pub use api::{TaskApiState, task_api_router};
