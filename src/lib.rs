//! Printable WiFi access cards.
//!
//! A [`WifiCredential`] is turned into the `WIFI:` provisioning string that
//! phone cameras understand, embedded in a QR code and laid out on a card that
//! can be written as PNG or print-ready SVG.

pub mod card;
pub mod color;
pub mod config;
pub mod credential;
pub mod error;
pub mod export;
pub mod logging;
pub mod provisioning;
pub mod qr;

pub use card::{CardContent, CardOptions, Orientation, Template};
pub use credential::{Encryption, WifiCredential};
pub use error::{Error, Result};
pub use provisioning::{ProvisioningString, decode, encode};
