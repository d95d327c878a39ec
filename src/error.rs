use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Initialization-time failures. The simulation never starts when one of these is raised;
/// once a `Scenario` exists every operation on it is total.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Domain width or height is not a finite positive number.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// Tick rate or catch-up cap is unusable.
    #[error("invalid timestep: {0}")]
    InvalidTimestep(String),

    /// A population entry is malformed (spawn area, attraction, duplicate name).
    #[error("invalid population `{name}`: {reason}")]
    InvalidPopulation { name: String, reason: String },

    /// An `influenced_by` entry names a population that does not exist.
    #[error("population `{population}` is influenced by unknown population `{influencer}`")]
    UnknownInfluencer { population: String, influencer: String },

    /// Boundary policy name not in the fixed policy list.
    #[error("unknown boundary policy `{0}`")]
    UnknownBoundaryPolicy(String),

    #[error("scenario has no populations")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_population() {
        let e = ConfigError::UnknownInfluencer {
            population: "green".into(),
            influencer: "blue".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("green"));
        assert!(msg.contains("blue"));
    }
}
