use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "ssh-manager";

/// Ensure a directory exists with proper permissions
pub fn ensure_directory(path: &Path) -> io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;

        // Set proper permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = std::fs::metadata(path)?.permissions();
            permissions.set_mode(0o700);
            std::fs::set_permissions(path, permissions)?;
        }
    }

    Ok(())
}

/// Replace `path` with `contents` without ever exposing a partial file.
///
/// The data goes to a temporary sibling which is flushed and then renamed
/// over the target. On any error the temporary file is removed and the
/// previous target is left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path);
    ensure_directory(dir)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".ssh-manager-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Per-user directory holding the profiles and settings files
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Expand a leading `~` and environment variables, falling back to the raw text
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(&raw).as_ref()),
    }
}
