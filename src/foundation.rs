pub mod error;
pub mod gate;
