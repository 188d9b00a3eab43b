//! Domain services

mod unique_id_generator;

pub use unique_id_generator::*;
