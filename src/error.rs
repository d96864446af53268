use thiserror::Error;

/// Errors raised while interpreting reservation cells or configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("unknown hotel '{0}'")]
    UnknownHotel(String),

    #[error("unknown arrival month '{0}'")]
    UnknownMonth(String),

    #[error("unknown customer type '{0}'")]
    UnknownCustomerType(String),

    #[error("'{0}' is not a 0/1 flag")]
    InvalidFlag(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidConfig { key: String, value: String },
}

/// Failure to assemble [`crate::Config`] from the environment.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Source(#[from] ::config::ConfigError),

    #[error(transparent)]
    Value(#[from] DataError),
}
