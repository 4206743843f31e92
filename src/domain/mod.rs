pub mod appointment;
pub mod error;
pub mod resource;
