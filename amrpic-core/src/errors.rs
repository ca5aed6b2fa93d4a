use amrpic_concepts::*;
use core::fmt::Display;

macro_rules! impl_error_variant {
    ($name: ident, $($err_var: ident),+) => {
        // Implement Display for ErrorVariant
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$err_var(message) => write!(f, "{}", message),
                    )+
                }
            }
        }
    }
}

macro_rules! impl_from_error {
    ($name: ident, $(($err_var: ident, $err_type: ty)),+) => {
        $(
            // Implement conversion from error to errorvariant
            impl From<$err_type> for $name {
                fn from(err: $err_type) -> Self {
                    $name::$err_var(err)
                }
            }
        )+
    }
}

/// Errors which can occur while reading or writing configuration files.
#[derive(Debug)]
pub enum ConfigError {
    /// Error related to File Io operations.
    IoError(std::io::Error),
    /// Occurs during parsing of json structs.
    SerdeJsonError(serde_json::Error),
    /// Occurs during parsing of ron structs.
    RonError(ron::error::SpannedError),
    /// Occurs when serializing to ron.
    RonSerializeError(ron::Error),
    /// The file extension does not correspond to a supported format.
    UnknownFormat(String),
}

impl_from_error! {ConfigError,
    (IoError, std::io::Error),
    (SerdeJsonError, serde_json::Error),
    (RonError, ron::error::SpannedError),
    (RonSerializeError, ron::Error)
}

impl_error_variant! {ConfigError,
    IoError,
    SerdeJsonError,
    RonError,
    RonSerializeError,
    UnknownFormat
}

impl std::error::Error for ConfigError {}

/// Covers all errors that can occur in the particle core.
/// The errors are listed from very likely to be a user error from almost certainly an internal error.
#[derive(Debug)]
pub enum PicError {
    // Very likely to be user errors
    /// See [SetupError]
    SetupError(SetupError),
    /// See [BoundaryError]
    BoundaryError(BoundaryError),
    /// See [RngError]
    RngError(RngError),
    /// See [ConfigError]
    ConfigError(ConfigError),

    // Less likely but possible to be user errors
    /// Installing the logging subscriber failed.
    LoggingError(String),

    // Highly unlikely to be user errors
    /// See [IndexError]
    IndexError(IndexError),
    /// Error related to File Io operations.
    IoError(std::io::Error),
}

impl_from_error! {PicError,
    (SetupError, SetupError),
    (BoundaryError, BoundaryError),
    (RngError, RngError),
    (ConfigError, ConfigError),
    (IndexError, IndexError),
    (IoError, std::io::Error)
}

impl_error_variant! {PicError,
    SetupError,
    BoundaryError,
    RngError,
    ConfigError,
    LoggingError,
    IndexError,
    IoError
}

// Implement the general error property
impl std::error::Error for PicError {}
