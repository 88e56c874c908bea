use tracing::level_filters::LevelFilter;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

/// Configuration of the subscriber that makes encoder diagnostics visible.
///
/// **Fields**
/// - `max_level`: most verbose level printed. Encoder notices are
///   `ERROR`, so anything except `OFF` shows them.
/// - `ansi`: colorize the stderr output.
#[derive(Clone, Debug)]
pub struct DiagnosticsConfig {
    pub max_level: LevelFilter,
    pub ansi: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            max_level: LevelFilter::WARN,
            ansi: false,
        }
    }
}

/// Install a global `tracing` subscriber that prints to stderr, so
/// notices from [`crate::diagnostics::TracingDiagnostics`] are not lost.
///
/// Stderr keeps diagnostics out of the record stream when records are
/// written to stdout.
///
/// **Returns**
/// - `Err(..)` if another global subscriber is already installed.
pub fn init_diagnostics_with_config(
    config: DiagnosticsConfig,
) -> Result<(), SetGlobalDefaultError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_filter(config.max_level);
    let subscriber = Registry::default().with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
}

/// Equivalent to [`init_diagnostics_with_config`] with
/// [`DiagnosticsConfig::default`].
pub fn init_diagnostics() -> Result<(), SetGlobalDefaultError> {
    init_diagnostics_with_config(DiagnosticsConfig::default())
}
