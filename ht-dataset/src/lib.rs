//! ht-dataset: safetensors game-dump reader + raw-code lookup table.

pub mod codec;
pub mod reader;
pub mod schema;

pub use codec::{ActionTable, ActionTemplates, CodecError, ColorEntry};
pub use reader::{Dataset, DatasetError, GameRecord};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
