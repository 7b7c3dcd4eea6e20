//! Regulatory domains: which channels may be used, which of them need DFS.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SapError};

/// Static bound on the channel table of one domain
pub const MAX_REG_CHANNELS: usize = 64;
/// Static bound on the NOL table (DFS channels of one domain)
pub const MAX_DFS_CHANNELS: usize = 32;

/// DFS rule set a domain follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DfsRegion {
    Fcc,
    Etsi,
    Mkk,
    Cn,
    Kr,
    /// World roaming: no DFS channels are enabled
    World,
}

impl fmt::Display for DfsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DfsRegion::Fcc => "FCC",
            DfsRegion::Etsi => "ETSI",
            DfsRegion::Mkk => "MKK",
            DfsRegion::Cn => "CN",
            DfsRegion::Kr => "KR",
            DfsRegion::World => "WORLD",
        };
        f.write_str(name)
    }
}

/// One channel of a regulatory domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegChannel {
    pub channel: u8,
    pub dfs: bool,
    pub indoor_only: bool,
    pub max_power_dbm: i8,
}

const fn ch(channel: u8, dfs: bool, indoor_only: bool, max_power_dbm: i8) -> RegChannel {
    RegChannel {
        channel,
        dfs,
        indoor_only,
        max_power_dbm,
    }
}

macro_rules! band {
    ($dfs:expr, $indoor:expr, $pwr:expr; $($c:expr),+ $(,)?) => {
        &[$(ch($c, $dfs, $indoor, $pwr)),+]
    };
}

const BG_1_11: &[RegChannel] = band!(false, false, 30; 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11);
const BG_12_13: &[RegChannel] = band!(false, false, 20; 12, 13);
const BG_14: &[RegChannel] = band!(false, false, 20; 14);
const UNII1: &[RegChannel] = band!(false, false, 23; 36, 40, 44, 48);
const UNII1_INDOOR: &[RegChannel] = band!(false, true, 23; 36, 40, 44, 48);
const UNII2A: &[RegChannel] = band!(true, false, 23; 52, 56, 60, 64);
const UNII2A_INDOOR: &[RegChannel] = band!(true, true, 23; 52, 56, 60, 64);
const UNII2C: &[RegChannel] =
    band!(true, false, 24; 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140, 144);
const UNII2C_ETSI: &[RegChannel] =
    band!(true, false, 30; 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140);
const UNII2C_KR: &[RegChannel] = band!(true, false, 24; 100, 104, 108, 112, 116, 120, 124);
const UNII3: &[RegChannel] = band!(false, false, 30; 149, 153, 157, 161, 165);

const ETSI_COUNTRIES: &[&str] = &[
    "AT", "BE", "CH", "CZ", "DE", "DK", "ES", "FI", "FR", "GB", "GR", "IE", "IT", "NL", "NO",
    "PL", "PT", "SE",
];

/// Country code, DFS region and channel table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatoryDomain {
    country: String,
    region: DfsRegion,
    channels: Vec<RegChannel>,
}

impl RegulatoryDomain {
    /// Build a domain from an explicit table, enforcing the static bounds.
    pub fn custom(
        country: impl Into<String>,
        region: DfsRegion,
        channels: Vec<RegChannel>,
    ) -> Result<Self> {
        let domain = Self {
            country: country.into(),
            region,
            channels,
        };
        domain.validate()?;
        Ok(domain)
    }

    fn from_bands(country: &str, region: DfsRegion, bands: &[&[RegChannel]]) -> Result<Self> {
        let channels = bands.iter().flat_map(|b| b.iter().copied()).collect();
        Self::custom(country, region, channels)
    }

    /// Look up the domain for an ISO 3166 alpha-2 code ("00" is world).
    pub fn for_country(country: &str) -> Result<Self> {
        let cc = country.to_ascii_uppercase();
        match cc.as_str() {
            "US" | "CA" => Self::from_bands(
                &cc,
                DfsRegion::Fcc,
                &[BG_1_11, UNII1, UNII2A, UNII2C, UNII3],
            ),
            "JP" => Self::from_bands(
                &cc,
                DfsRegion::Mkk,
                &[BG_1_11, BG_12_13, BG_14, UNII1_INDOOR, UNII2A_INDOOR, UNII2C_ETSI],
            ),
            "CN" => Self::from_bands(
                &cc,
                DfsRegion::Cn,
                &[BG_1_11, BG_12_13, UNII1, UNII2A, UNII3],
            ),
            "KR" => Self::from_bands(
                &cc,
                DfsRegion::Kr,
                &[BG_1_11, BG_12_13, UNII1, UNII2A, UNII2C_KR, UNII3],
            ),
            "00" => Self::from_bands(&cc, DfsRegion::World, &[BG_1_11, UNII1]),
            c if ETSI_COUNTRIES.contains(&c) => Self::from_bands(
                &cc,
                DfsRegion::Etsi,
                &[BG_1_11, BG_12_13, UNII1, UNII2A, UNII2C_ETSI],
            ),
            _ => Err(SapError::UnknownCountry(country.to_string())),
        }
    }

    /// Channel count must fit the static tables and entries must be unique.
    pub fn validate(&self) -> Result<()> {
        if self.channels.len() > MAX_REG_CHANNELS {
            return Err(SapError::TableOverflow {
                table: "regulatory channel table",
                count: self.channels.len(),
                max: MAX_REG_CHANNELS,
            });
        }
        let dfs = self.channels.iter().filter(|c| c.dfs).count();
        if dfs > MAX_DFS_CHANNELS {
            return Err(SapError::TableOverflow {
                table: "NOL table",
                count: dfs,
                max: MAX_DFS_CHANNELS,
            });
        }
        for (i, c) in self.channels.iter().enumerate() {
            if c.channel == 0 {
                return Err(SapError::invalid_channel(0, "channel 0 is reserved"));
            }
            if self.channels[..i].iter().any(|o| o.channel == c.channel) {
                return Err(SapError::invalid_channel(c.channel, "duplicate entry"));
            }
        }
        Ok(())
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn region(&self) -> DfsRegion {
        self.region
    }

    pub fn channels(&self) -> &[RegChannel] {
        &self.channels
    }

    pub fn channel(&self, channel: u8) -> Option<&RegChannel> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    pub fn contains(&self, channel: u8) -> bool {
        self.channel(channel).is_some()
    }

    pub fn is_dfs(&self, channel: u8) -> bool {
        self.channel(channel).map(|c| c.dfs).unwrap_or(false)
    }

    pub fn is_indoor_only(&self, channel: u8) -> bool {
        self.channel(channel).map(|c| c.indoor_only).unwrap_or(false)
    }

    /// ETSI weather radar channels, which carry longer CAC and NOP
    pub fn is_weather_channel(&self, channel: u8) -> bool {
        self.region == DfsRegion::Etsi && matches!(channel, 120 | 124 | 128)
    }

    pub fn dfs_channels(&self) -> Vec<u8> {
        self.channels
            .iter()
            .filter(|c| c.dfs)
            .map(|c| c.channel)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fcc_domain() {
        let us = RegulatoryDomain::for_country("us").unwrap();
        assert_eq!(us.region(), DfsRegion::Fcc);
        assert!(us.is_dfs(52));
        assert!(us.is_dfs(144));
        assert!(!us.is_dfs(36));
        assert!(!us.contains(13));
        assert_eq!(us.dfs_channels().len(), 16);
        assert!(!us.is_weather_channel(120));
    }

    #[test]
    fn test_etsi_weather() {
        let de = RegulatoryDomain::for_country("DE").unwrap();
        assert_eq!(de.region(), DfsRegion::Etsi);
        assert!(de.is_weather_channel(124));
        assert!(!de.is_weather_channel(116));
        assert!(!de.contains(149));
    }

    #[test]
    fn test_japan_indoor() {
        let jp = RegulatoryDomain::for_country("JP").unwrap();
        assert!(jp.is_indoor_only(52));
        assert!(!jp.is_indoor_only(100));
        assert!(jp.contains(14));
    }

    #[test]
    fn test_unknown_country() {
        assert_eq!(
            RegulatoryDomain::for_country("ZZ"),
            Err(SapError::UnknownCountry("ZZ".to_string()))
        );
    }

    #[test]
    fn test_table_bounds() {
        let too_many: Vec<RegChannel> = (1..=40).map(|c| ch(c, true, false, 20)).collect();
        assert!(matches!(
            RegulatoryDomain::custom("XX", DfsRegion::Fcc, too_many),
            Err(SapError::TableOverflow { max: MAX_DFS_CHANNELS, .. })
        ));

        let dup = vec![ch(36, false, false, 20), ch(36, false, false, 20)];
        assert!(RegulatoryDomain::custom("XX", DfsRegion::Fcc, dup).is_err());
    }
}
