//! Feature flags for a negotiated server version.
//!
//! Flags are derived once, when a generator is constructed, and never probed
//! again during compilation. [`Capabilities`] is a plain `Copy` snapshot and is
//! safe to share between any number of concurrent compilations.
use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::error::Error;

/// Answers what CAST targets the connected server understands.
pub trait CapabilityProvider {
    /// `CAST(x AS double)` is accepted.
    fn supports_double_cast(&self) -> bool;
    /// `CAST(x AS float)` is accepted.
    fn supports_float_cast(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    pub supports_double_cast: bool,
    pub supports_float_cast: bool,
}

impl Capabilities {
    /// Every optional syntax is available.
    pub const fn all() -> Self {
        Self {
            supports_double_cast: true,
            supports_float_cast: true,
        }
    }

    /// Nothing optional is available; every workaround applies.
    pub const fn none() -> Self {
        Self {
            supports_double_cast: false,
            supports_float_cast: false,
        }
    }

    pub fn from_provider(provider: &impl CapabilityProvider) -> Self {
        Self {
            supports_double_cast: provider.supports_double_cast(),
            supports_float_cast: provider.supports_float_cast(),
        }
    }
}

impl CapabilityProvider for Capabilities {
    fn supports_double_cast(&self) -> bool {
        self.supports_double_cast
    }

    fn supports_float_cast(&self) -> bool {
        self.supports_float_cast
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ServerFlavor {
    MySql,
    MariaDb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerVersion {
    pub flavor: ServerFlavor,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(flavor: ServerFlavor, major: u32, minor: u32, patch: u32) -> Self {
        Self {
            flavor,
            major,
            minor,
            patch,
        }
    }

    pub fn at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        (self.major, self.minor, self.patch) >= (major, minor, patch)
    }
}

// MariaDB servers older than 11 report themselves as "5.5.5-<real version>"
//  so that ancient MySQL clients accept the handshake.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:5\.5\.5-)?(?P<major>\d+)\.(?P<minor>\d+)(?:\.(?P<patch>\d+))?(?P<suffix>.*)$")
        .expect("version pattern is valid")
});

impl FromStr for ServerVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidServerVersion(s.to_string());
        let caps = VERSION_PATTERN.captures(s.trim()).ok_or_else(invalid)?;
        let number = |name: &str| -> Result<u32, Error> {
            caps.name(name)
                .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
        };

        let flavor = if caps["suffix"].to_ascii_lowercase().contains("mariadb") {
            ServerFlavor::MariaDb
        } else {
            ServerFlavor::MySql
        };
        Ok(Self::new(
            flavor,
            number("major")?,
            number("minor")?,
            number("patch")?,
        ))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}-{}", self.major, self.minor, self.patch, self.flavor)
    }
}

impl CapabilityProvider for ServerVersion {
    fn supports_double_cast(&self) -> bool {
        match self.flavor {
            ServerFlavor::MySql => self.at_least(8, 0, 17),
            ServerFlavor::MariaDb => self.at_least(10, 4, 0),
        }
    }

    fn supports_float_cast(&self) -> bool {
        match self.flavor {
            ServerFlavor::MySql => self.at_least(8, 0, 17),
            ServerFlavor::MariaDb => false,
        }
    }
}
