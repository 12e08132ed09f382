use clap::Parser;

mod app;
mod audio;
mod config;
mod engine;
mod gateway;
mod lyrics;
mod model;
mod mpris;
mod runtime;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    runtime::run(runtime::Cli::parse()).await
}
