pub mod artifact;
pub mod common;
pub mod errors;
pub mod schema;
pub mod synth;

pub mod database;
pub mod server;
pub mod services;
