use thiserror::Error;

use crate::core::types::PlayerId;

/// Fatal failures of a resolution. Raised during setup, before any phase runs.
#[derive(Error, Debug)]
pub enum AutoResolveError {
    #[error(
        "Force '{}' could not be converted into a formation: {}; members: [{}]",
        .force,
        .reason,
        .members.join(", ")
    )]
    FormationConversion {
        force: String,
        owner: Option<PlayerId>,
        members: Vec<String>,
        reason: String,
    },

    #[error("Unknown player: {0:?}")]
    UnknownPlayer(PlayerId),

    #[error("Invalid force string: {0}")]
    InvalidForceString(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AutoResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formation_failure_lists_members() {
        let err = AutoResolveError::FormationConversion {
            force: "Alpha Lance".into(),
            owner: Some(PlayerId(1)),
            members: vec!["Atlas".into(), "Locust".into()],
            reason: "mixed owners".into(),
        };
        let message = err.to_string();
        assert!(message.contains("Alpha Lance"));
        assert!(message.contains("Atlas, Locust"));
        assert!(message.contains("mixed owners"));
    }
}
