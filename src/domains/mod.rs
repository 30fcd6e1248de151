//! Domains module containing business logic organized by bounded contexts.
//!
//! The server exposes a single domain: schema-validated tools.

pub mod tools;
