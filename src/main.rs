mod capture;
mod cli;
mod config;
mod domain;
mod editor;
mod export;
mod handoff;
mod render;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    cli::run(cli::Cli::parse())
}
