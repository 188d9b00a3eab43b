//! Domain layer

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;
pub mod views;
