//! Configuration for the booking event loop

use crate::error::{Error, Result};

/// Execution settings of a [`BookingFrame`](crate::BookingFrame)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads, and therefore slots handed to every helper
    pub n_threads: usize,
    /// Smallest number of rows a worker processes in one piece
    pub min_chunk_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_threads: num_cpus::get(),
            min_chunk_len: 1024,
        }
    }
}

impl EngineConfig {
    /// Single worker, single slot
    pub fn sequential() -> Self {
        Self {
            n_threads: 1,
            ..Self::default()
        }
    }

    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    pub fn with_min_chunk_len(mut self, min_chunk_len: usize) -> Self {
        self.min_chunk_len = min_chunk_len;
        self
    }

    /// Reject settings the event loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.n_threads == 0 {
            return Err(Error::InvalidParameter(
                "n_threads must be at least 1".to_string(),
            ));
        }
        if self.min_chunk_len == 0 {
            return Err(Error::InvalidParameter(
                "min_chunk_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.n_threads >= 1);
        assert_eq!(config.min_chunk_len, 1024);
        assert!(config.validate().is_ok());
        assert_eq!(EngineConfig::sequential().n_threads, 1);
    }

    #[test]
    fn test_builder_and_validation() {
        let config = EngineConfig::sequential()
            .with_threads(3)
            .with_min_chunk_len(16);
        assert_eq!(
            config,
            EngineConfig {
                n_threads: 3,
                min_chunk_len: 16
            }
        );
        assert!(config.with_threads(0).validate().is_err());
        assert!(config.with_min_chunk_len(0).validate().is_err());
    }
}
