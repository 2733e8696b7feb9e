use chrono::{DateTime, Utc};
use std::time::Duration;

/// What the status indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// The API server answered the probe with a success status.
    Connected,
    /// The API server answered, but not with a success status.
    Degraded,
    /// No answer at all.
    Unreachable,
}

/// Result of the most recent connection check against the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// The API server answered the probe, whatever the status code.
    pub reachable: bool,
    pub status_code: Option<u16>,
    pub last_checked: DateTime<Utc>,
    /// Why the probe failed, when it did.
    pub error: Option<String>,
}

impl ConnectionStatus {
    /// Status for a probe that received an HTTP response.
    pub fn answered(status_code: u16, checked_at: DateTime<Utc>) -> Self {
        Self {
            reachable: true,
            status_code: Some(status_code),
            last_checked: checked_at,
            error: None,
        }
    }

    /// Status for a probe that received no response.
    pub fn unreachable(error: impl Into<String>, checked_at: DateTime<Utc>) -> Self {
        Self {
            reachable: false,
            status_code: None,
            last_checked: checked_at,
            error: Some(error.into()),
        }
    }

    pub fn health(&self) -> Health {
        match (self.reachable, self.status_code) {
            (false, _) => Health::Unreachable,
            (true, Some(code)) if (200..300).contains(&code) => Health::Connected,
            (true, _) => Health::Degraded,
        }
    }

    /// Whether the check is older than `ttl` at `now`.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.last_checked);
        age.to_std().is_ok_and(|age| age >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_classification() {
        let now = Utc::now();
        assert_eq!(ConnectionStatus::answered(200, now).health(), Health::Connected);
        assert_eq!(ConnectionStatus::answered(204, now).health(), Health::Connected);
        assert_eq!(ConnectionStatus::answered(503, now).health(), Health::Degraded);
        assert_eq!(
            ConnectionStatus::unreachable("refused", now).health(),
            Health::Unreachable
        );
    }

    #[test]
    fn test_degraded_is_still_reachable() {
        let status = ConnectionStatus::answered(404, Utc::now());
        assert!(status.reachable);
        assert!(status.error.is_none());
    }

    #[test]
    fn test_staleness() {
        let checked = Utc::now();
        let status = ConnectionStatus::answered(200, checked);
        let ttl = Duration::from_secs(30);

        assert!(!status.is_stale(ttl, checked + chrono::Duration::seconds(10)));
        assert!(status.is_stale(ttl, checked + chrono::Duration::seconds(30)));
        // Clock went backwards: keep the status.
        assert!(!status.is_stale(ttl, checked - chrono::Duration::seconds(5)));
    }

    #[test]
    fn test_zero_ttl_always_stale() {
        let checked = Utc::now();
        let status = ConnectionStatus::answered(200, checked);
        assert!(status.is_stale(Duration::ZERO, checked));
    }
}
