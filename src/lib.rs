//! Taskboard - Kanban Task Management Backend
//!
//! A REST backend for a per-user Kanban board: account registration and
//! login with a JWT access/refresh session lifecycle, and owner-scoped
//! task CRUD on top of PostgreSQL.

pub mod core;
