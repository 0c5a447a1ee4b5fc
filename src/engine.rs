//! Binding the pdfium shared library.
//!
//! The library is looked up once, by the caller, and the resulting
//! [`Pdfium`] handle is passed by reference to every operation. Lookup
//! order:
//!
//! 1. an explicit path (`--pdfium-lib`), file or directory
//! 2. `PDFIUM_LIB_PATH`, file or directory
//! 3. the platform library name in the current working directory
//! 4. the system library search path
//!
//! An explicit path or environment variable that fails to bind is an error;
//! lookup does not fall through to the later candidates.

use crate::error::PosterError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind pdfium following the lookup order above.
///
/// # Errors
/// [`PosterError::PdfiumBindingFailed`] when no candidate binds.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, PosterError> {
    if let Some(path) = lib_path {
        return bind_pdfium_from_path(path);
    }

    if let Some(path) = std::env::var_os(PDFIUM_LIB_PATH_ENV).filter(|v| !v.is_empty()) {
        debug!("Using {}={}", PDFIUM_LIB_PATH_ENV, Path::new(&path).display());
        return bind_pdfium_from_path(Path::new(&path));
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    if local.exists() {
        return bind_pdfium_from_path(&local);
    }

    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| PosterError::PdfiumBindingFailed(format!("system library: {}", e)))?;
    info!("Bound pdfium from the system library path");
    Ok(Pdfium::new(bindings))
}

/// Bind the pdfium library at `path`. A directory is searched for the
/// platform library name (`libpdfium.so`, `libpdfium.dylib`, `pdfium.dll`).
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PosterError> {
    let library = resolve_library_path(path);
    let bindings = Pdfium::bind_to_library(&library).map_err(|e| {
        PosterError::PdfiumBindingFailed(format!("{}: {}", library.display(), e))
    })?;
    info!("Bound pdfium from {}", library.display());
    Ok(Pdfium::new(bindings))
}

fn resolve_library_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
