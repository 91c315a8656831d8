use log::LevelFilter;

/// Initialize logging using env_logger.
/// Defaults to debug; `RUST_LOG` overrides, e.g.
/// `RUST_LOG=crosspost_core=info crosspost connect`
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();
}
