//! fitframe: decode FIT files into column-oriented tables.

use clap::Parser;
use ff_core::cli::{run, Cli};
use ff_core::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_config());
    let code = run(&cli);
    std::process::exit(code.as_i32());
}
