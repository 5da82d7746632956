pub mod config;
pub mod constants;
pub mod engine;
pub mod pellets;
pub mod rng;
pub mod room;
pub mod server_protocol;
pub mod types;
pub mod world;
