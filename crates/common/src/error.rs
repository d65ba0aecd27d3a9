/// Errors raised while configuring or constructing the scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A parameter is outside the domain the model accepts.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// Rejection sampling ran out of attempts before placing every prop.
    #[error("placement exhausted: placed {placed} of {requested} after {attempts} attempts")]
    PlacementExhausted {
        placed: usize,
        requested: usize,
        attempts: usize,
    },
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SceneError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_names_the_field() {
        let e = SceneError::invalid("hour", "not finite");
        assert_eq!(e.to_string(), "invalid parameter `hour`: not finite");
    }

    #[test]
    fn exhausted_reports_progress() {
        let e = SceneError::PlacementExhausted {
            placed: 3,
            requested: 20,
            attempts: 100,
        };
        assert!(e.to_string().contains("placed 3 of 20"));
    }
}
