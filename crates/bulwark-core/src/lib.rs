//! Core types and definitions for the BULWARK perimeter-defense simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! cells, components, enums, events, constants, settings and the
//! snapshot/save records. It has no dependency on the ECS runtime.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
