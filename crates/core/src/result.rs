// crates/core/src/result.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Buffer error: {0}")]
    Buffer(String),

    #[error("Sample source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type SensorResult<T> = Result<T, SensorError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_json(input: &str) -> SensorResult<serde_json::Value> {
        Ok(serde_json::from_str(input)?)
    }

    fn parse_toml(input: &str) -> SensorResult<toml::Table> {
        Ok(input.parse::<toml::Table>()?)
    }

    #[test]
    fn library_errors_keep_their_kind() {
        assert!(matches!(parse_json("{"), Err(SensorError::Serialization(_))));
        assert!(matches!(parse_toml("[buffer"), Err(SensorError::TomlParse(_))));
        assert!(parse_toml("[buffer]\ncapacity = 5").is_ok());
    }
}
