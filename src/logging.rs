use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when RUST_LOG is unset
fn default_level(debug: bool, machine_output: bool) -> &'static str {
    if debug {
        "debug"
    } else if machine_output {
        "warn"
    } else {
        "info"
    }
}

/// Log to stderr so stdout stays clean for JSON and CSV
pub(crate) fn init(debug: bool, machine_output: bool, use_color: bool) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_level(debug, machine_output).to_string());

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_color)
                .without_time(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_wins() {
        assert_eq!(default_level(true, true), "debug");
        assert_eq!(default_level(true, false), "debug");
    }

    #[test]
    fn machine_output_is_quiet() {
        assert_eq!(default_level(false, true), "warn");
        assert_eq!(default_level(false, false), "info");
    }
}
