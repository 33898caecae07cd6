//! Error types for SukshmaCtl

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SukshmaCtl error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// CAN adapter reported an error status
    #[error("CAN error: {0}")]
    Can(String),

    /// Unsupported CAN bitrate for the adapter
    #[error("Unsupported CAN bitrate: {0} bit/s")]
    UnsupportedBitrate(u32),

    /// Other end of an inter-thread channel has gone away
    #[error("Channel closed")]
    ChannelClosed,

    /// Worker thread panicked before it could be joined
    #[error("Thread panicked")]
    ThreadPanic,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
