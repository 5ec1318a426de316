//! # TrainTrack API Server Library
//!
//! HTTP surface for TrainTrack: session-based authentication, role-gated
//! training and technician records, and compliance reports.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and session resolution
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
