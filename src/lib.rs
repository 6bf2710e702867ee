//! Terminal client for the car rental booking backend.
//!
//! Customers browse cars by date range and book them; administrators manage
//! the fleet and every booking's status. All business rules live in the
//! backend; this crate only talks to it and keeps per-view list state.

pub mod config;
pub mod controller;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod session;
pub mod shell;
