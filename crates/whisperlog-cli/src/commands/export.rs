use std::path::{Path, PathBuf};

use whisperlog_core::export::{self, render_export};

use crate::cli::ExportFormat;
use crate::commands::common::{open_store, CommandContext, OpenStoreMode};
use crate::error::CliError;

pub async fn run_export(
    ctx: &CommandContext,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let store = open_store(ctx, OpenStoreMode::Standard).await?;
    let entries = store.current();
    let rendered = render_export(&entries, format.into())?;

    if let Some(path) = output_path {
        let target = export_target(path, format);
        std::fs::write(&target, rendered)?;
        println!("{}", target.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// Directories receive the fixed export file name.
pub fn export_target(path: &Path, format: ExportFormat) -> PathBuf {
    if path.is_dir() {
        path.join(export::export_file_name(format.into()))
    } else {
        path.to_path_buf()
    }
}

impl From<ExportFormat> for export::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}
