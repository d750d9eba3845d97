//! ht-bench: criterion micro-benchmarks. See `benches/`.

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
