//! Logger setup for the binary.
//!
//! `RUST_LOG` wins over the configured level when it is set.

use std::io::Write;

use crate::config::LogType;

pub fn init_logging(log_type: LogType) {
    let default_filter = log_type.level_filter().to_string().to_lowercase();
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, default_filter),
    );

    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .target(env_logger::Target::Stderr);

    // A second init (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::init_logging;
    use crate::config::LogType;
    use log::LevelFilter;

    #[test]
    fn log_types_map_to_level_filters() {
        assert_eq!(LogType::None.level_filter(), LevelFilter::Off);
        assert_eq!(LogType::ErrorOnly.level_filter(), LevelFilter::Error);
        assert_eq!(LogType::All.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LogType::ErrorOnly);
        init_logging(LogType::All);
        log::info!("logger initialised twice");
    }
}
