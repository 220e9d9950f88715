mod app;
pub mod logging;
mod persistence;
mod render;

pub use app::{run_app, RunOptions};
