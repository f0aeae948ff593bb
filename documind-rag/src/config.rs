//! Configuration for the retrieval-and-grounding engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks of a page.
    pub chunk_overlap: usize,
    /// Default number of results returned by a query.
    pub top_k: usize,
    /// Default minimum similarity score; candidates below it are dropped.
    pub min_score: f32,
    /// Over-fetch multiplier applied to `top_k` before filtering and
    /// deduplication, to compensate for post-filter loss.
    pub overfetch_factor: usize,
    /// Deadline applied to each external embedding/generation call.
    /// `None` leaves the calls unbounded.
    pub request_timeout: Option<Duration>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 5,
            min_score: 0.0,
            overfetch_factor: 4,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Validate that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `overfetch_factor == 0`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.overfetch_factor == 0 {
            return Err(RagError::ConfigError(
                "overfetch_factor must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of results returned by a query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the default minimum similarity score for query results.
    pub fn min_score(mut self, score: f32) -> Self {
        self.config.min_score = score;
        self
    }

    /// Set the over-fetch multiplier used during retrieval.
    pub fn overfetch_factor(mut self, factor: usize) -> Self {
        self.config.overfetch_factor = factor;
        self
    }

    /// Set the deadline for each external embedding/generation call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Leave external calls unbounded. The caller is then responsible for
    /// applying its own cancellation policy.
    pub fn no_request_timeout(mut self) -> Self {
        self.config.request_timeout = None;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if validation fails;
    /// see [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
