pub mod prepare;
pub mod scrub;
