//! ht-render: JSON snapshot and text trace renderers.
//!
//! Renderers consume engine output read-only; all formatting and file naming
//! lives here, none of it in the engine.

use std::path::Path;

use thiserror::Error;

pub mod json;
pub mod text;

pub use json::{game_doc, write_game_json, GameDoc};
pub use text::{render_trace, write_trace};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a rendered file atomically via temp file + rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
