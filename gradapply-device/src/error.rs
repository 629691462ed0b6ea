use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Invalid device configuration for {key}: {value:?} ({reason})")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },
    #[error("Failed to build the worker pool for device {id}: {source}")]
    PoolBuild {
        id: u32,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

impl DeviceError {
    pub(crate) fn invalid_config(key: &str, value: impl ToString, reason: &str) -> Self {
        DeviceError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
