use std::sync::Once;

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();
static LEVEL: OnceCell<Level> = OnceCell::new();

/// Maps repeated `-v` flags to a level for this crate.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,wifi_card={level}")))
}

/// Installs the global subscriber once; later calls keep the first level.
pub fn init(verbosity: u8) {
    let level = *LEVEL.get_or_init(|| level_for(verbosity));
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(filter(level))
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_level(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), Level::INFO);
        assert_eq!(level_for(1), Level::DEBUG);
        assert_eq!(level_for(5), Level::TRACE);
    }
}
