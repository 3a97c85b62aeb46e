use crate::config::DEFAULT_EXPIRATION_SECS;
use crate::error::StageError;
use std::time::Duration;

/// Longest lifetime a SigV4 presigned URL may have: 7 days.
pub const MAX_EXPIRATION_SECS: i64 = 604_800;

/// A validated presigned URL lifetime, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiration(u64);

impl Expiration {
    /// Rejects zero, negative and over-long lifetimes up front instead of
    /// leaving them to the provider.
    pub fn new(secs: i64) -> Result<Self, StageError> {
        if secs <= 0 || secs > MAX_EXPIRATION_SECS {
            return Err(StageError::InvalidExpiration(secs));
        }
        Ok(Self(secs as u64))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Self(DEFAULT_EXPIRATION_SECS as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_seven_days() {
        assert_eq!(Expiration::default().as_secs(), 604_800);
        assert_eq!(
            Expiration::default().as_duration(),
            Duration::from_secs(7 * 24 * 60 * 60)
        );
    }

    #[test]
    fn test_zero_and_negative_are_rejected() {
        assert!(matches!(
            Expiration::new(0),
            Err(StageError::InvalidExpiration(0))
        ));
        assert!(matches!(
            Expiration::new(-60),
            Err(StageError::InvalidExpiration(-60))
        ));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Expiration::new(1).unwrap().as_secs(), 1);
        assert_eq!(Expiration::new(604_800).unwrap().as_secs(), 604_800);
        assert!(Expiration::new(604_801).is_err());
    }
}
