use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::de::{self, Deserializer};

use crate::error::{Error, Result};

/// Authentication scheme advertised in the `T:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encryption {
    /// WPA, WPA2 and WPA3 personal networks.
    #[default]
    Wpa,
    Wep,
    /// Open network without a password.
    None,
}

impl Encryption {
    pub const ALL: &'static [Self] = &[Self::Wpa, Self::Wep, Self::None];
    const NAMES: &'static [&'static str] = &["WPA", "WEP", "NONE"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::None => "NONE",
        }
    }

    /// Value written after `T:`; open networks carry no token.
    pub fn auth_token(&self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::None => "",
        }
    }

    /// Human readable label printed on cards.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "Open Network",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encryption {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WPA" | "WPA2" | "WPA3" => Ok(Self::Wpa),
            "WEP" => Ok(Self::Wep),
            "NONE" | "OPEN" | "NOPASS" => Ok(Self::None),
            _ => Err(Error::UnknownEncryption(raw.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Encryption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Credentials of a single WiFi network.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WifiCredential {
    pub ssid: String,
    pub password: String,
    pub encryption: Encryption,
    pub hidden: bool,
}

impl WifiCredential {
    pub fn new(
        ssid: impl Into<String>,
        password: impl Into<String>,
        encryption: Encryption,
    ) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
            encryption,
            hidden: false,
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Rejects input a scanner could not join. The encoder itself accepts anything.
    pub fn validate(&self) -> Result<()> {
        if self.ssid.trim().is_empty() {
            return Err(Error::EmptySsid);
        }
        Ok(())
    }
}
