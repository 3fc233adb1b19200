// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{LayoutError, LayoutErrorKind};
use crate::emitter::elf::{ImageConfig, PAGE_ALIGN};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Emits a minimal statically-linked x86-64 Linux executable that writes
a message to stdout and exits 0.

The image is described as a tree of layout chips; header fields that
depend on the sizes of later segments (entry point, program header
entry size, segment file size, message address and length) are
computed lazily during the single resolve pass, so no offset needs to
be maintained by hand.

--base takes a hexadecimal virtual base address with or without a 0x
prefix; it must be 4k-aligned because the load segment starts at file
offset 0.";

#[derive(Parser, Debug)]
#[command(
    name = "layForge",
    version = VERSION,
    about = "Lazy binary-layout composer emitting a minimal x86-64 ELF executable",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        default_value = "a.out",
        long_help = "Write the resolved image to FILE. The file is marked executable."
    )]
    pub outfile: PathBuf,
    #[arg(
        long = "base",
        value_name = "HEX",
        default_value = "400000",
        long_help = "Virtual base address of the load segment, in hexadecimal. Must be 4k-aligned."
    )]
    pub base: String,
    #[arg(
        short = 'm',
        long = "message",
        value_name = "TEXT",
        default_value = "kthxbye!\n",
        long_help = "Message the produced executable writes to stdout."
    )]
    pub message: String,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select summary output format. text is default; json enables machine-readable output."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress the build summary for successful runs. Errors are still reported."
    )]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Validated run configuration derived from the raw CLI arguments.
#[derive(Debug, Clone)]
pub struct EmitConfig {
    pub outfile: PathBuf,
    pub image: ImageConfig,
}

pub fn validate_cli(cli: &Cli) -> Result<EmitConfig, LayoutError> {
    let digits = cli.base.trim_start_matches("0x").trim_start_matches("0X");
    let virtual_base = u64::from_str_radix(digits, 16).map_err(|_| {
        LayoutError::new(
            LayoutErrorKind::Cli,
            "invalid hexadecimal base address",
            Some(&cli.base),
        )
    })?;
    if virtual_base % PAGE_ALIGN != 0 {
        return Err(LayoutError::new(
            LayoutErrorKind::Cli,
            "base address must be 4k-aligned",
            Some(&cli.base),
        ));
    }
    if cli.message.is_empty() {
        return Err(LayoutError::new(
            LayoutErrorKind::Cli,
            "message must not be empty",
            None,
        ));
    }
    Ok(EmitConfig {
        outfile: cli.outfile.clone(),
        image: ImageConfig {
            virtual_base,
            message: cli.message.clone().into_bytes(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_base(base: &str) -> Cli {
        Cli::parse_from(["layForge", "--base", base])
    }

    #[test]
    fn defaults_are_valid() {
        let cli = Cli::parse_from(["layForge"]);
        let config = validate_cli(&cli).unwrap();
        assert_eq!(config.image.virtual_base, 0x400000);
        assert_eq!(config.image.message, b"kthxbye!\n");
        assert_eq!(config.outfile, PathBuf::from("a.out"));
    }

    #[test]
    fn base_accepts_0x_prefix() {
        let config = validate_cli(&cli_with_base("0x7f0000")).unwrap();
        assert_eq!(config.image.virtual_base, 0x7f0000);
    }

    #[test]
    fn base_rejects_garbage() {
        let err = validate_cli(&cli_with_base("narf")).unwrap_err();
        assert_eq!(err.kind(), LayoutErrorKind::Cli);
        assert!(err.message().contains("narf"));
    }

    #[test]
    fn base_rejects_unaligned_address() {
        let err = validate_cli(&cli_with_base("400010")).unwrap_err();
        assert!(err.message().contains("4k-aligned"));
    }

    #[test]
    fn empty_message_is_rejected() {
        let cli = Cli::parse_from(["layForge", "--message", ""]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.kind(), LayoutErrorKind::Cli);
    }
}
