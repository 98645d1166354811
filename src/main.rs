mod api;
mod app;
mod comments;
mod config;
mod error;
mod logging;
mod optimistic;
mod preview;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
