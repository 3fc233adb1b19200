// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Artifact writing and build-summary formatting.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::core::error::LayoutError;

use super::EmitReport;

/// Write the resolved image and mark it executable.
pub(super) fn write_image(path: &Path, bytes: &[u8]) -> Result<(), LayoutError> {
    fs::write(path, bytes)
        .map_err(|err| LayoutError::io(&err, &format!("failed to write {}", path.display())))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|err| {
            LayoutError::io(
                &err,
                &format!("failed to mark {} executable", path.display()),
            )
        })?;
    }
    Ok(())
}

pub(super) fn build_summary_text(report: &EmitReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}: {} bytes, entry {:#x}\n",
        report.outfile.display(),
        report.total_size,
        report.entry_point
    ));
    out.push_str(&format!(
        "  elf_header {} + program_header_table {} + code {} + message {}",
        report.header_size, report.table_size, report.code_size, report.message_size
    ));
    out
}

pub(super) fn build_summary_json(report: &EmitReport) -> String {
    json!({
        "outfile": report.outfile.display().to_string(),
        "total_size": report.total_size,
        "entry_point": report.entry_point,
        "segments": {
            "elf_header": report.header_size,
            "program_header_table": report.table_size,
            "code": report.code_size,
            "message": report.message_size,
        },
    })
    .to_string()
}
