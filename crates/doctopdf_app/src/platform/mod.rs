mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;
