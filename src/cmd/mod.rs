pub mod api;
pub mod prepare;
pub mod scrub;
pub mod time;
