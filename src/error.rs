use thiserror::Error;

/// Library error type for wifi-card operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The network name is empty or whitespace only.
    #[error("network name (SSID) must not be empty")]
    EmptySsid,

    /// Encryption type outside of WPA/WEP/NONE and their aliases.
    #[error("unknown encryption type: {0}")]
    UnknownEncryption(String),

    #[error("unknown card template: {0}")]
    UnknownTemplate(String),

    #[error("unknown card orientation: {0}")]
    UnknownOrientation(String),

    #[error("unsupported export format: {0}")]
    UnknownFormat(String),

    /// Color string is not `#rgb` or `#rrggbb`.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Expiration date lies before the current day.
    #[error("expiration date {0} is in the past")]
    ExpirationInPast(chrono::NaiveDate),

    /// Text is not a well-formed `WIFI:...;;` provisioning string.
    #[error("malformed provisioning string: {0}")]
    MalformedPayload(&'static str),

    /// A required field is absent from a provisioning string.
    #[error("provisioning string is missing the {0}: field")]
    MissingField(&'static str),

    /// The QR encoder rejected the payload (usually too long).
    #[error("failed to encode QR code: {0}")]
    Qr(#[from] qrcode::types::QrError),

    /// No usable font could be loaded for raster card output.
    #[error("font error: {0}")]
    Font(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Raster encoding error.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
