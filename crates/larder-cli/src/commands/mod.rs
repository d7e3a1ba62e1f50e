pub mod config;
pub mod cook;
pub mod devices;
pub mod generate;
pub mod interactive;
pub mod library;
pub mod setup;
pub mod shop;
