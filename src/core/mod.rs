//! Core business logic for the task management backend

pub mod auth;
pub mod config;
pub mod db;
pub mod tasks;
