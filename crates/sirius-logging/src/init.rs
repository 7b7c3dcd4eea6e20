use std::path::Path;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::fs::log_dir;
use crate::targets::{SUBSYSTEMS, T_ACS, T_CSR, T_DFS, T_SAP};

static RELOAD: OnceCell<reload::Handle<EnvFilter, Registry>> = OnceCell::new();

/// Keeps the non-blocking file writers flushing; hold for the process lifetime
pub struct LoggingGuards {
    _file_guards: Vec<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Logs go to stdout, to `<root>/logs/<component>.log` and, per subsystem
/// target, to `sap.log`, `dfs.log`, `acs.log` and `csr.log`. If the log
/// directory cannot be created only stdout logging is set up. Calling this
/// more than once keeps the first subscriber.
pub fn init(component: &str, root: &Path, cfg: &LoggingConfig) -> Result<LoggingGuards> {
    let filter = build_filter(cfg);
    let (filter_layer, handle) = reload::Layer::new(filter);
    let _ = RELOAD.set(handle);

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .compact();

    let base = tracing_subscriber::registry()
        .with(filter_layer)
        .with(ErrorLayer::default())
        .with(stdout_layer);

    let log_dir = log_dir(root);
    if let Err(err) = std::fs::create_dir_all(&log_dir) {
        base.try_init().ok();
        let _ = LogTracer::init();
        tracing::warn!("File logging disabled ({}): {}", log_dir.display(), err);
        return Ok(LoggingGuards {
            _file_guards: Vec::new(),
        });
    }

    let component_appender = tracing_appender::rolling::daily(&log_dir, format!("{component}.log"));
    let (component_writer, component_guard) = tracing_appender::non_blocking(component_appender);
    let component_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_writer(component_writer)
        .with_filter(component_targets());

    let (sap_layer, sap_guard) = subsystem_layer(&log_dir, T_SAP);
    let (dfs_layer, dfs_guard) = subsystem_layer(&log_dir, T_DFS);
    let (acs_layer, acs_guard) = subsystem_layer(&log_dir, T_ACS);
    let (csr_layer, csr_guard) = subsystem_layer(&log_dir, T_CSR);

    base.with(component_layer)
        .with(sap_layer)
        .with(dfs_layer)
        .with(acs_layer)
        .with(csr_layer)
        .try_init()
        .ok();
    let _ = LogTracer::init();

    Ok(LoggingGuards {
        _file_guards: vec![component_guard, sap_guard, dfs_guard, acs_guard, csr_guard],
    })
}

/// Swap the active level filter
pub fn apply(cfg: &LoggingConfig) -> Result<()> {
    let handle = RELOAD
        .get()
        .ok_or_else(|| anyhow::anyhow!("logging not initialized"))?;
    handle.reload(build_filter(cfg))?;
    Ok(())
}

fn build_filter(cfg: &LoggingConfig) -> EnvFilter {
    if !cfg.enabled {
        return EnvFilter::new("off");
    }
    EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The component file gets everything the subsystem files do not
fn component_targets() -> Targets {
    SUBSYSTEMS
        .iter()
        .fold(Targets::new().with_default(LevelFilter::TRACE), |t, (target, _)| {
            t.with_target(*target, LevelFilter::OFF)
        })
}

fn file_name(target: &str) -> &'static str {
    SUBSYSTEMS
        .iter()
        .find(|(t, _)| *t == target)
        .map(|(_, name)| *name)
        .unwrap_or("other.log")
}

fn subsystem_layer<S>(
    log_dir: &Path,
    target: &'static str,
) -> (impl Layer<S> + Send + Sync, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let appender = tracing_appender::rolling::daily(log_dir, file_name(target));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_writer(writer)
        .with_filter(Targets::new().with_target(target, LevelFilter::TRACE));
    (layer, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        let cfg = LoggingConfig {
            level: "sap=loud".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(build_filter(&cfg).to_string(), "info");
    }

    #[test]
    fn test_disabled_is_off() {
        let cfg = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert_eq!(build_filter(&cfg).to_string(), "off");
    }

    #[test]
    fn test_subsystem_file_names() {
        assert_eq!(file_name(T_DFS), "dfs.log");
        assert_eq!(file_name(T_CSR), "csr.log");
    }
}
