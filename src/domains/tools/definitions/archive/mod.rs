//! Zip archive tools.

pub mod create;
pub mod extract;
pub mod list;

pub use create::ZipCreateTool;
pub use extract::ZipExtractTool;
pub use list::ZipListTool;

use std::fs::File;
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use crate::domains::tools::ToolError;

pub(crate) fn zip_error(e: ZipError) -> ToolError {
    match e {
        ZipError::Io(io) => ToolError::Io(io),
        other => ToolError::failed(format!("Zip error: {}", other)),
    }
}

pub(crate) fn open_archive(path: &Path) -> Result<ZipArchive<File>, ToolError> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(zip_error)
}
