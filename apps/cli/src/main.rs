//! nbdeploy CLI — publish year-prefixed notebooks as HTML documentation.
//!
//! Rebuilds `docs/_posts/{year}-*.html` from `notebooks/{year}-*.ipynb` and
//! optionally regenerates the aggregate index page.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
