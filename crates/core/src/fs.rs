//! Filesystem utilities

use std::fs;
use std::path::Path;

use log::info;

/// Create a directory and all parent directories if they don't exist
///
/// This is a wrapper around `std::fs::create_dir_all` with logging.
pub fn create_dir_all(path: &str) -> std::io::Result<()> {
    let path = Path::new(path);
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {}", path.display());
    }
    Ok(())
}
