//! The `WIFI:` provisioning string understood by phone camera QR scanners.
//!
//! ```text
//! WIFI:S:<ssid>;T:<WPA|WEP|>;P:<password>;[H:true;];
//! ```
//!
//! Open networks are written with an empty auth token (`T:;`) rather than
//! dropping the field, and the hidden flag is only written when set. The
//! reserved characters `\`, `;`, `,` and `:` are backslash escaped in both
//! the SSID and the password.

use std::fmt;

use crate::credential::{Encryption, WifiCredential};
use crate::error::{Error, Result};

const PREFIX: &str = "WIFI:";
const TERMINATOR: &str = ";;";
const RESERVED: [char; 4] = ['\\', ';', ',', ':'];

/// Encoded provisioning payload, ready to hand to a QR renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProvisioningString(String);

impl ProvisioningString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ProvisioningString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProvisioningString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for ch in value.chars() {
        if RESERVED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Builds the provisioning string for `credential`. Never fails.
pub fn encode(credential: &WifiCredential) -> ProvisioningString {
    let hidden = if credential.hidden { "H:true;" } else { "" };
    ProvisioningString(format!(
        "{PREFIX}S:{ssid};T:{auth};P:{password};{hidden};",
        ssid = escape_field(&credential.ssid),
        auth = credential.encryption.auth_token(),
        password = escape_field(&credential.password),
    ))
}

/// Parses a provisioning string back into a credential.
///
/// Unknown keys are skipped the way scanners skip them. A missing `T:` field
/// reads as an open network and a missing `P:` field as an empty password.
pub fn decode(text: &str) -> Result<WifiCredential> {
    let body = text
        .strip_prefix(PREFIX)
        .ok_or(Error::MalformedPayload("missing WIFI: prefix"))?;
    if !body.ends_with(TERMINATOR) {
        return Err(Error::MalformedPayload("missing ;; terminator"));
    }

    let mut ssid = None;
    let mut password = None;
    let mut encryption = None;
    let mut hidden = false;

    let fields = split_fields(body)?;
    if !fields.last().is_some_and(String::is_empty) {
        return Err(Error::MalformedPayload("missing ;; terminator"));
    }

    for field in fields {
        if field.is_empty() {
            continue;
        }
        let Some((key, value)) = field.split_once(':') else {
            return Err(Error::MalformedPayload("field without key"));
        };
        match key {
            "S" => ssid = Some(value.to_string()),
            "P" => password = Some(value.to_string()),
            "T" => {
                encryption = Some(if value.is_empty() {
                    Encryption::None
                } else {
                    value.parse()?
                })
            }
            "H" => hidden = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    Ok(WifiCredential {
        ssid: ssid.ok_or(Error::MissingField("S"))?,
        password: password.unwrap_or_default(),
        encryption: encryption.unwrap_or(Encryption::None),
        hidden,
    })
}

/// Splits on unescaped `;`, unescaping values. Keys never contain escapes so
/// the first unescaped `:` of each field still separates key from value; that
/// separator is kept literal while escaped colons come back as plain `:`.
fn split_fields(body: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut key_done = false;
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or(Error::MalformedPayload("dangling escape"))?;
                if !key_done {
                    return Err(Error::MalformedPayload("escaped character in key"));
                }
                current.push(escaped);
            }
            ';' => {
                fields.push(std::mem::take(&mut current));
                key_done = false;
            }
            ':' if !key_done => {
                current.push(':');
                key_done = true;
            }
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        return Err(Error::MalformedPayload("unterminated field"));
    }
    Ok(fields)
}
