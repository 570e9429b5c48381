//! Directory acceptance checks for the two file-backed sources.

use std::fs;
use std::path::Path;

use super::BackendError;

/// Bank metadata file names, in preference order.
pub const BANK_INFO_FILES: [&str; 2] = ["SoundbanksInfo.json", "SoundbanksInfo.xml"];

/// The directory exists and holds a `.wproj` project file.
pub fn check_project_directory(path: &Path) -> Result<(), BackendError> {
    ensure_directory(path)?;
    let entries = fs::read_dir(path).map_err(BackendError::io(path))?;
    let found = entries
        .flatten()
        .any(|entry| entry.path().extension().is_some_and(|ext| ext == "wproj"));
    if found {
        Ok(())
    } else {
        Err(BackendError::MissingProjectFile(path.to_path_buf()))
    }
}

/// The directory exists and holds `SoundbanksInfo.json` or `.xml`.
pub fn check_bank_directory(path: &Path) -> Result<(), BackendError> {
    ensure_directory(path)?;
    if BANK_INFO_FILES.iter().any(|name| path.join(name).is_file()) {
        Ok(())
    } else {
        Err(BackendError::MissingBankInfo(path.to_path_buf()))
    }
}

pub fn validate_project_directory(path: &Path) -> bool {
    check_project_directory(path).is_ok()
}

pub fn validate_bank_directory(path: &Path) -> bool {
    check_bank_directory(path).is_ok()
}

fn ensure_directory(path: &Path) -> Result<(), BackendError> {
    if !path.exists() {
        return Err(BackendError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(BackendError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}
