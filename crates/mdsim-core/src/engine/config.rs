use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Parameters fixed for the lifetime of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of integration steps; the run produces `step_count + 1` frames.
    pub step_count: usize,
    /// Step size in the ensemble's time unit.
    pub step_size: f64,
    pub periodic: bool,
}

impl SimulationConfig {
    pub fn num_frames(&self) -> usize {
        self.step_count + 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "step_size",
                reason: format!("must be finite and positive, got {}", self.step_size),
            });
        }
        if self.step_count == usize::MAX {
            return Err(ConfigError::InvalidParameter {
                name: "step_count",
                reason: "leaves no room for the initial frame".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    step_count: Option<usize>,
    step_size: Option<f64>,
    periodic: Option<bool>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_count(mut self, steps: usize) -> Self {
        self.step_count = Some(steps);
        self
    }
    pub fn step_size(mut self, dt: f64) -> Self {
        self.step_size = Some(dt);
        self
    }
    /// Defaults to `false` (aperiodic).
    pub fn periodic(mut self, periodic: bool) -> Self {
        self.periodic = Some(periodic);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let config = SimulationConfig {
            step_count: self
                .step_count
                .ok_or(ConfigError::MissingParameter("step_count"))?,
            step_size: self
                .step_size
                .ok_or(ConfigError::MissingParameter("step_size"))?,
            periodic: self.periodic.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }
}
