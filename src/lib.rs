//! Client-side data layer of the clinic administration system.
//!
//! Dates typed into forms are normalized to canonical UTC timestamps
//! ([`util::time`]), request bodies are scrubbed of empty fields
//! ([`engine::scrub`]), and both are applied by the resource client
//! ([`api`]) before anything is sent to the backend.

pub mod adapters;
pub mod api;
pub mod cmd;
pub mod config;
pub mod domain;
pub mod engine;
pub mod io;
pub mod util;
