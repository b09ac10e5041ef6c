//! # Todoflow Core
//!
//! Entity model, observable repository, and use cases for the todoflow
//! reactive state core.
//!
//! This crate is the domain layer of a small unidirectional state-management
//! system. It provides:
//!
//! - **Entity model**: the [`todo::Todo`] record and its invariants
//! - **Repository**: a concurrency-safe, observable key-value store that
//!   publishes every change as a new immutable snapshot
//! - **Use cases**: stateless business operations (list/filter, add, toggle,
//!   delete) that validate input and call the repository
//! - **Clock**: an injectable time source so timestamps stay deterministic
//!   under test
//!
//! ## Architecture Principles
//!
//! - Immutable snapshots: readers never hold a reference into mutable memory
//! - Explicit ownership: the repository is constructed and passed in, never
//!   looked up through a global
//! - Explicit results: use cases return `Result` and never panic
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use todoflow_core::clock::SystemClock;
//! use todoflow_core::repository::TodoRepository;
//! use todoflow_core::usecases::AddTodo;
//!
//! let repository = Arc::new(TodoRepository::new());
//! let add = AddTodo::new(Arc::clone(&repository), Arc::new(SystemClock));
//!
//! let id = add.execute("Buy milk", "2 liters").await?;
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod clock;
pub mod error;
pub mod repository;
pub mod todo;
pub mod usecases;
