//! Structured logging.

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "destripe_config=info"
    } else {
        "destripe_config=warn"
    }
}

/// Handle to the installed subscriber's filter.
///
/// Logging starts before parameters are loaded, so the level derived from `verbose` is
/// only known afterwards; [`LogHandle::set_verbose`] applies it.
pub struct LogHandle {
    /// `None` when `RUST_LOG` drives the filter or another subscriber was installed first.
    filter: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LogHandle {
    /// Switch to the level for `verbose`. No-op when `RUST_LOG` is set.
    pub fn set_verbose(&self, verbose: bool) {
        if let Some(handle) = &self.filter {
            if let Err(err) = handle.reload(EnvFilter::new(default_directive(verbose))) {
                tracing::warn!(%err, "Failed to update log filter");
            }
        }
    }

    pub fn is_reloadable(&self) -> bool {
        self.filter.is_some()
    }
}

/// Install the global subscriber. Later calls leave the first subscriber in place.
pub fn init_logging(verbose: bool) -> LogHandle {
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_driven = from_env.is_some();
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(default_directive(verbose)));
    let (filter, handle) = reload::Layer::new(filter);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok();

    LogHandle {
        filter: (installed && !env_driven).then_some(handle),
    }
}
