use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, or by
/// `default_directive` when the variable is unset or invalid.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case nothing changes.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_noop() {
        init_tracing("debug");
        assert!(!init_tracing("info"));
    }
}
