//! Shared `env_logger` setup for the `node` and `controller` binaries.

/// Installs a logger at `info` by default; `RUST_LOG` overrides per the
/// usual `env_logger` convention.
pub fn init() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
