use log::LevelFilter;

/// Installs the terminal logger. `RUST_LOG` overrides the default filter.
pub fn init() {
    let mut builder = pretty_env_logger::formatted_builder();
    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        builder.filter_level(LevelFilter::Error);
        builder.filter_module("watersense_config", LevelFilter::Info);
    }

    // A second init, e.g. from tests, keeps the first logger.
    if builder.try_init().is_err() {
        log::debug!("logger already installed");
    }
}
