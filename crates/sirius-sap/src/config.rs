use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dfs::DfsTiming;
use crate::error::{Result, SapError};
use crate::regulatory::RegulatoryDomain;
use crate::select::SelectionPolicy;

pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_MAX_SESSIONS: usize = 4;
pub const DEFAULT_CAC_MS: u64 = 60_000;
pub const DEFAULT_WEATHER_CAC_MS: u64 = 600_000;
pub const DEFAULT_NOP_SECS: u64 = 30 * 60;
pub const DEFAULT_WEATHER_NOP_SECS: u64 = 60 * 60;

/// Controller-wide SoftAP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SapConfig {
    /// ISO 3166 alpha-2 code of the regulatory domain
    pub country: String,
    pub timing: DfsTiming,
    /// Start beaconing on DFS channels without a CAC
    pub skip_cac: bool,
    pub policy: SelectionPolicy,
    pub max_sessions: usize,
}

impl Default for SapConfig {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            timing: DfsTiming::default(),
            skip_cac: false,
            policy: SelectionPolicy::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl SapConfig {
    pub fn from_env() -> Self {
        let country = env::var("SIRIUS_SAP_COUNTRY")
            .ok()
            .map(|v| v.trim().to_ascii_uppercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
        let cac_ms = env_u64("SIRIUS_SAP_CAC_MS", DEFAULT_CAC_MS);
        let weather_cac_ms = env_u64("SIRIUS_SAP_WEATHER_CAC_MS", DEFAULT_WEATHER_CAC_MS);
        let nop_secs = env_u64("SIRIUS_SAP_NOP_SECS", DEFAULT_NOP_SECS);
        let weather_nop_secs = env_u64("SIRIUS_SAP_WEATHER_NOP_SECS", DEFAULT_WEATHER_NOP_SECS);
        let max_sessions = env::var("SIRIUS_SAP_MAX_SESSIONS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_SESSIONS);

        let policy = SelectionPolicy {
            japan_w53_disabled: env_bool("SIRIUS_SAP_JAPAN_W53_DISABLED", false),
            outdoor: env_bool("SIRIUS_SAP_OUTDOOR", false),
            prefer_non_dfs: env_bool("SIRIUS_SAP_PREFER_NON_DFS", false),
            avoid_channels: env_list("SIRIUS_SAP_AVOID_CHANNELS")
                .unwrap_or_default()
                .iter()
                .filter_map(|c| c.parse::<u8>().ok())
                .collect(),
        };

        Self {
            country,
            timing: DfsTiming {
                cac: Duration::from_millis(cac_ms),
                weather_cac: Duration::from_millis(weather_cac_ms),
                non_occupancy: Duration::from_secs(nop_secs),
                weather_non_occupancy: Duration::from_secs(weather_nop_secs),
            },
            skip_cac: env_bool("SIRIUS_SAP_SKIP_CAC", false),
            policy,
            max_sessions,
        }
    }

    pub fn regulatory_domain(&self) -> Result<RegulatoryDomain> {
        RegulatoryDomain::for_country(&self.country)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_sessions == 0 || self.max_sessions > usize::from(u8::MAX) {
            return Err(SapError::config(format!(
                "max_sessions must be 1-{}",
                u8::MAX
            )));
        }
        if self.timing.non_occupancy.is_zero() {
            return Err(SapError::config("non-occupancy period must be non-zero"));
        }
        Ok(())
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(default)
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env::var(key).ok().map(|s| {
        s.split(',')
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: &[&str] = &[
        "SIRIUS_SAP_COUNTRY",
        "SIRIUS_SAP_CAC_MS",
        "SIRIUS_SAP_WEATHER_CAC_MS",
        "SIRIUS_SAP_NOP_SECS",
        "SIRIUS_SAP_WEATHER_NOP_SECS",
        "SIRIUS_SAP_SKIP_CAC",
        "SIRIUS_SAP_PREFER_NON_DFS",
        "SIRIUS_SAP_JAPAN_W53_DISABLED",
        "SIRIUS_SAP_OUTDOOR",
        "SIRIUS_SAP_MAX_SESSIONS",
        "SIRIUS_SAP_AVOID_CHANNELS",
    ];

    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.remember(key);
            std::env::set_var(key, value);
        }

        fn remove(&mut self, key: &str) {
            self.remember(key);
            std::env::remove_var(key);
        }

        fn remember(&mut self, key: &str) {
            if !self.vars.iter().any(|(k, _)| k == key) {
                self.vars.push((key.to_string(), std::env::var(key).ok()));
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..) {
                match value {
                    Some(val) => std::env::set_var(&key, val),
                    None => std::env::remove_var(&key),
                }
            }
        }
    }

    #[test]
    fn test_defaults_without_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut guard = EnvGuard::new();
        for key in KEYS {
            guard.remove(key);
        }

        let cfg = SapConfig::from_env();
        assert_eq!(cfg, SapConfig::default());
        assert_eq!(cfg.timing.cac, Duration::from_secs(60));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.regulatory_domain().unwrap().country(), "US");
    }

    #[test]
    fn test_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut guard = EnvGuard::new();
        for key in KEYS {
            guard.remove(key);
        }
        guard.set("SIRIUS_SAP_COUNTRY", "jp");
        guard.set("SIRIUS_SAP_CAC_MS", "1500");
        guard.set("SIRIUS_SAP_NOP_SECS", "120");
        guard.set("SIRIUS_SAP_SKIP_CAC", "yes");
        guard.set("SIRIUS_SAP_JAPAN_W53_DISABLED", "1");
        guard.set("SIRIUS_SAP_MAX_SESSIONS", "2");
        guard.set("SIRIUS_SAP_AVOID_CHANNELS", "1, 6,bogus,11");

        let cfg = SapConfig::from_env();
        assert_eq!(cfg.country, "JP");
        assert_eq!(cfg.timing.cac, Duration::from_millis(1500));
        assert_eq!(cfg.timing.non_occupancy, Duration::from_secs(120));
        assert!(cfg.skip_cac);
        assert!(cfg.policy.japan_w53_disabled);
        assert!(!cfg.policy.outdoor);
        assert_eq!(cfg.max_sessions, 2);
        assert_eq!(cfg.policy.avoid_channels, vec![1, 6, 11]);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut guard = EnvGuard::new();
        for key in KEYS {
            guard.remove(key);
        }
        guard.set("SIRIUS_SAP_MAX_SESSIONS", "0");
        guard.set("SIRIUS_SAP_CAC_MS", "soon");

        let cfg = SapConfig::from_env();
        assert_eq!(cfg.max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(cfg.timing.cac, Duration::from_millis(DEFAULT_CAC_MS));
    }
}
