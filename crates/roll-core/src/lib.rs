//! # roll-core
//!
//! Core types, session state machine, and error types for Rollcall.
//!
//! This crate provides the foundational types shared across all Rollcall crates:
//! - Entity structs for the attendance domain (sections, class sessions, records)
//! - Status and role enums with state machine transitions
//! - ID prefix constants
//! - The `CoreError` taxonomy surfaced by every lifecycle operation
//! - Clock abstraction so expiry can be simulated deterministically
//! - Access code generation and one-way verifiers
//! - Expiry deadline calculation and the authorization guard
//! - Read-side report builders and CSV exports

pub mod audit_detail;
pub mod clock;
pub mod code;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod expiry;
pub mod export;
pub mod guard;
pub mod ids;
pub mod link;
pub mod report;
pub mod responses;
