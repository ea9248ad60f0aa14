pub mod config;
pub mod health;
pub mod read;
pub mod setup;
pub mod ui;
pub mod utils;
