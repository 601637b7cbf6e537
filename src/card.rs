use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::{self, Deserializer};

use crate::color::Rgb;
use crate::credential::WifiCredential;
use crate::error::{Error, Result};
use crate::provisioning::{self, ProvisioningString};

/// Placeholder shown instead of masked secrets.
pub const MASK: &str = "••••••••";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    Business,
    Modern,
}

impl Template {
    const NAMES: &'static [&'static str] = &["business", "modern"];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Modern => "modern",
        }
    }

    /// Colors a template falls back to when none are configured.
    pub fn default_colors(&self) -> CardColors {
        match self {
            Self::Business => CardColors {
                primary: Rgb::from_hex(0x3b82f6),
                secondary: Rgb::from_hex(0xdbeafe),
            },
            Self::Modern => CardColors {
                primary: Rgb::from_hex(0x6366f1),
                secondary: Rgb::from_hex(0xeef2ff),
            },
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Self::Business),
            "modern" => Ok(Self::Modern),
            _ => Err(Error::UnknownTemplate(raw.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    const NAMES: &'static [&'static str] = &["landscape", "portrait"];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            _ => Err(Error::UnknownOrientation(raw.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Resolved card palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardColors {
    pub primary: Rgb,
    pub secondary: Rgb,
}

/// Configured colors; unset entries come from the template palette.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ColorOverrides {
    pub primary: Option<Rgb>,
    pub secondary: Option<Rgb>,
}

/// Cosmetic settings of a printed card.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct CardOptions {
    pub template: Template,
    pub orientation: Orientation,
    pub colors: ColorOverrides,
    pub show_password: bool,
    /// Only consulted for hidden networks, whose name is masked unless this is set.
    pub show_ssid: Option<bool>,
    pub additional_info: Option<String>,
    pub expires: Option<NaiveDate>,
}

impl CardOptions {
    pub fn colors(&self) -> CardColors {
        let base = self.template.default_colors();
        CardColors {
            primary: self.colors.primary.unwrap_or(base.primary),
            secondary: self.colors.secondary.unwrap_or(base.secondary),
        }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(expires) = self.expires
            && expires < today
        {
            return Err(Error::ExpirationInPast(expires));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub label: &'static str,
    pub value: String,
}

/// Everything printed on a card, already masked and formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub template: Template,
    pub title: &'static str,
    pub badge: &'static str,
    pub network_label: &'static str,
    pub network: String,
    pub hidden: bool,
    pub password: Option<CardField>,
    pub security: CardField,
    pub expires: Option<CardField>,
    pub additional_info: Option<String>,
    pub footer: &'static str,
    pub payload: ProvisioningString,
}

impl CardContent {
    pub fn build(credential: &WifiCredential, options: &CardOptions) -> Self {
        let template = options.template;
        let (title, badge, network_label, expires_label, footer) = match template {
            Template::Business => (
                "WiFi Access",
                "Scan to connect",
                "NETWORK NAME",
                "EXPIRES",
                "Scan this QR code with your camera app to connect automatically",
            ),
            Template::Modern => (
                "Connect",
                "WiFi",
                "NETWORK",
                "VALID UNTIL",
                "Scan with your phone camera to connect",
            ),
        };

        let show_ssid = options.show_ssid.unwrap_or(!credential.hidden);
        let network = if credential.hidden && !show_ssid {
            MASK.to_string()
        } else {
            credential.ssid.clone()
        };

        let password = (!credential.password.is_empty()).then(|| CardField {
            label: "PASSWORD",
            value: if options.show_password {
                credential.password.clone()
            } else {
                MASK.to_string()
            },
        });

        let security = CardField {
            label: "SECURITY",
            value: credential.encryption.label().to_string(),
        };

        let expires = options.expires.map(|date| CardField {
            label: expires_label,
            value: format_expiration(date),
        });

        let additional_info = options
            .additional_info
            .as_deref()
            .map(str::trim)
            .filter(|info| !info.is_empty())
            .map(str::to_string);

        Self {
            template,
            title,
            badge,
            network_label,
            network,
            hidden: credential.hidden,
            password,
            security,
            expires,
            additional_info,
            footer,
            payload: provisioning::encode(credential),
        }
    }
}

/// `March 5, 2027`
pub fn format_expiration(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
