use thiserror::Error;

/// Structured error hierarchy for `steergen`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how to report; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum SteergenError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("api: {0}")]
    Api(#[from] ApiError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    // Generic fallthrough (wraps anyhow for interop)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// CLI argument violations, rejected before any external call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("strength must satisfy -0.5 <= min <= max <= 0.5 (got min={min}, max={max})")]
    StrengthRange { min: f64, max: f64 },

    #[error("feature index must be between 0 and 4 (got {0})")]
    FeatureIndex(u8),

    #[error("variations must be at least 1")]
    Variations,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an empty response")]
    EmptyResponse { service: &'static str },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("insert into {table} returned no row")]
    NoRowReturned { table: String },

    #[error("feature set {0} not found")]
    FeatureSetNotFound(uuid::Uuid),

    #[error("feature set {0} has no cached descriptors")]
    EmptyFeatureSet(uuid::Uuid),
}

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, SteergenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_variable_name() {
        let err = SteergenError::Config(ConfigError::Missing("GOODFIRE_API_KEY"));
        assert!(err.to_string().contains("GOODFIRE_API_KEY"));
    }

    #[test]
    fn strength_range_displays_bounds() {
        let err = SteergenError::Validation(ValidationError::StrengthRange {
            min: -0.51,
            max: 0.5,
        });
        assert!(err.to_string().contains("-0.51"));
    }

    #[test]
    fn api_status_displays_service_and_code() {
        let err = SteergenError::Api(ApiError::Status {
            service: "fal",
            status: 503,
            body: "overloaded".into(),
        });
        let text = err.to_string();
        assert!(text.contains("fal"));
        assert!(text.contains("503"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: SteergenError = anyhow_err.into();
        assert!(err.to_string().contains("something went wrong"));
    }
}
