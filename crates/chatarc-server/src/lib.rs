//! Chatarc Server Library
//!
//! HTTP service that archives time-bounded slices of a Discord channel.
//!
//! # Overview
//!
//! The server exposes a small REST API around an asynchronous export engine:
//!
//! - **POST /exports**: validate a time window, admit it through a fixed
//!   rate window, record a `pending` job, and schedule it for execution
//! - **GET /exports/:job_id**: poll a job's lifecycle state and counters
//! - **GET /status**: list recent jobs, newest first
//! - **GET /health**, **GET /metrics**: operational endpoints
//!
//! # Architecture
//!
//! The server follows a **CQRS (Command Query Responsibility Segregation)**
//! architecture: the exports feature is a vertical slice with commands (job
//! creation), queries (job lookup and listing), routes, and validated DTOs.
//!
//! Execution itself lives in the `archive` module: a rate limiter gates
//! admission, a `MessageExporter` shells out to DiscordChatExporter, and a
//! `JobRunner` drives each job through `pending -> running -> completed`
//! (or `failed`), reconciling what the exporter produced against what the
//! store actually inserted.
//!
//! Persistence sits behind the `ExportStore` trait with a PostgreSQL
//! implementation for production and an in-memory one for tests.
//!
//! ## Framework Stack
//!
//! - **Axum**: Modern, ergonomic web framework
//! - **SQLx**: Type-safe SQL queries with compile-time verification
//! - **Tower**: Middleware and service abstractions

pub mod archive;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod metrics;
pub mod middleware;
pub mod models;

// Re-export commonly used types
pub use error::AppError;
