mod app;
mod cli;
mod config;
mod consts;
mod error;
mod runner;
mod utils;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    std::process::exit(app::run(cli));
}
