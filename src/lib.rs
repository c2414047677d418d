pub mod config;
pub mod errors;
pub mod repositories;
pub mod routes;
pub mod rota;
pub mod services;
pub mod state;
pub mod structs;
