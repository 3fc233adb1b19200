// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! ELF image emission - the calling layer around the layout engine.
//!
//! This module owns CLI-driven run flow: argument validation, image
//! construction, the single resolve pass, and artifact output.

pub mod cli;
pub mod elf;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::core::error::LayoutError;
use cli::{validate_cli, Cli, EmitConfig, OutputFormat};
use elf::ElfImage;
use output::{build_summary_json, build_summary_text, write_image};

/// What one successful run produced.
#[derive(Debug, Clone)]
pub struct EmitReport {
    pub outfile: PathBuf,
    pub total_size: u64,
    pub entry_point: u64,
    pub header_size: u64,
    pub table_size: u64,
    pub code_size: u64,
    pub message_size: u64,
}

impl EmitReport {
    /// Render the summary in the requested format.
    pub fn summary(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => build_summary_text(self),
            OutputFormat::Json => build_summary_json(self),
        }
    }
}

/// Run the emitter with command-line arguments.
pub fn run() -> Result<EmitReport, LayoutError> {
    let cli = Cli::parse();
    run_with_cli(&cli)
}

pub fn run_with_cli(cli: &Cli) -> Result<EmitReport, LayoutError> {
    let config = validate_cli(cli)?;
    let report = emit(&config)?;
    Ok(report)
}

/// Build, resolve, and write one image.
pub fn emit(config: &EmitConfig) -> Result<EmitReport, LayoutError> {
    let image = ElfImage::build(&config.image)?;
    let bytes = image.resolve()?;
    write_image(&config.outfile, &bytes)?;

    let (header_size, table_size, code_size, message_size) = image.segment_sizes();
    Ok(EmitReport {
        outfile: config.outfile.clone(),
        total_size: bytes.len() as u64,
        entry_point: image.entry_point(),
        header_size,
        table_size,
        code_size,
        message_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn emit_writes_executable_image() {
        let dir = std::env::temp_dir();
        let outfile = dir.join(format!("layforge-emit-test-{}", std::process::id()));
        let cli = Cli::parse_from([
            "layForge",
            "-o",
            outfile.to_str().unwrap(),
            "-m",
            "hi\n",
        ]);
        let report = run_with_cli(&cli).unwrap();
        assert_eq!(report.total_size, 64 + 56 + 39 + 3);
        assert_eq!(report.entry_point, 0x400000 + 64 + 56);

        let written = std::fs::read(&outfile).unwrap();
        assert_eq!(written.len() as u64, report.total_size);
        assert_eq!(&written[..4], b"\x7fELF");
        std::fs::remove_file(&outfile).unwrap();
    }

    #[test]
    fn summary_formats_render() {
        let report = EmitReport {
            outfile: "a.out".into(),
            total_size: 162,
            entry_point: 0x400078,
            header_size: 64,
            table_size: 56,
            code_size: 39,
            message_size: 3,
        };
        let text = report.summary(OutputFormat::Text);
        assert!(text.contains("162 bytes"));
        assert!(text.contains("entry 0x400078"));

        let parsed: serde_json::Value =
            serde_json::from_str(&report.summary(OutputFormat::Json)).unwrap();
        assert_eq!(parsed["total_size"], 162);
        assert_eq!(parsed["segments"]["code"], 39);
    }
}
