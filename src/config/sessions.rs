//! Session listing and enrollment tuning

use serde::Deserialize;

use super::error::ValidationError;

/// Hard ceiling for `max_page_size` and `upcoming_limit`.
const PAGE_SIZE_CEILING: u32 = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Page size when the request names none
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Larger requested page sizes are clamped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Attempts a write makes before reporting a version conflict
    #[serde(default = "default_enroll_max_attempts")]
    pub enroll_max_attempts: u32,

    /// Default length of the upcoming-sessions feed
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: u32,
}

impl SessionsConfig {
    /// Applies the default and the ceiling to a requested page size.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        match requested {
            None | Some(0) => self.default_page_size,
            Some(n) => n.min(self.max_page_size),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_page_size == 0
            || self.max_page_size > PAGE_SIZE_CEILING
            || self.default_page_size == 0
            || self.default_page_size > self.max_page_size
        {
            return Err(ValidationError::InvalidPageSize {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        if self.enroll_max_attempts == 0 {
            return Err(ValidationError::InvalidRetryBudget);
        }
        if self.upcoming_limit == 0 || self.upcoming_limit > PAGE_SIZE_CEILING {
            return Err(ValidationError::InvalidUpcomingLimit(PAGE_SIZE_CEILING));
        }
        Ok(())
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            enroll_max_attempts: default_enroll_max_attempts(),
            upcoming_limit: default_upcoming_limit(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_enroll_max_attempts() -> u32 {
    5
}

fn default_upcoming_limit() -> u32 {
    10
}
