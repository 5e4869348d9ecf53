mod app;
mod artwork;
mod audio;
mod config;
mod error;
mod library;
mod lyrics;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
