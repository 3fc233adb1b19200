// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for layForge.

use clap::Parser;

use layforge::emitter::cli::Cli;
use layforge::emitter::run_with_cli;

fn main() {
    let cli = Cli::parse();
    match run_with_cli(&cli) {
        Ok(report) => {
            if !cli.quiet {
                println!("{}", report.summary(cli.format));
            }
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
