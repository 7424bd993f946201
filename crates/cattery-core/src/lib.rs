//! # Cattery Core
//!
//! The domain layer of the cattery service.
//! This crate contains entities, ports and the thin service layer that
//! sits between the HTTP handlers and the persistence adapters. It performs
//! no I/O of its own.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
