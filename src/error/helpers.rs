use super::{ErrorCode, TemplaError};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to a generic configuration error with the original as source
    fn to_config_error(self, message: impl Into<String>) -> Result<T, TemplaError>;

    /// Convert to a configuration error with a specific code
    fn to_config_error_with_code(
        self,
        code: u16,
        message: impl Into<String>,
    ) -> Result<T, TemplaError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_config_error(self, message: impl Into<String>) -> Result<T, TemplaError> {
        self.to_config_error_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    fn to_config_error_with_code(
        self,
        code: u16,
        message: impl Into<String>,
    ) -> Result<T, TemplaError> {
        self.map_err(|e| TemplaError::config_with_code(code, message).with_source(e))
    }
}
