pub mod bootstrap;
pub mod config;
pub mod controllers;
pub mod firebase;
pub mod gemini;
pub mod routes;
pub mod services;
