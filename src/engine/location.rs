//! One-shot position resolution with a deterministic fallback.
//!
//! The resolver does not talk to the platform itself. [`LocationResolver::resolve`]
//! hands back a [`PositionRequest`] describing what to ask the platform for, and
//! the platform's answer (or silence) comes back through `on_position`,
//! `on_failure` or `on_timeout`. Every attempt is numbered so that a late answer
//! to an earlier attempt cannot overwrite a settled one.

use crate::domain::Coordinate;
use std::time::Duration;

/// Default time the platform gets to answer a position request.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Why live geolocation was not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFailure {
    PermissionDenied,
    CapabilityMissing,
    Timeout,
    /// The capability answered with something that is not a valid coordinate.
    Malformed(String),
}

impl std::fmt::Display for LocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::CapabilityMissing => f.write_str("location capability unavailable"),
            Self::Timeout => f.write_str("timed out"),
            Self::Malformed(detail) => write!(f, "malformed position: {detail}"),
        }
    }
}

/// Observable resolver status, three-way for the UI once a request was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationStatus {
    /// `resolve` has not been called yet.
    Idle,
    Resolving,
    Resolved,
    Unavailable(LocationFailure),
}

/// What the platform should be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    pub attempt: u64,
    pub timeout: Duration,
    pub high_accuracy: bool,
}

/// Outcome of a settled attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub status: LocationStatus,
}

/// Resolves the session's "current location" once per request.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    fallback: Coordinate,
    timeout: Duration,
    attempt: u64,
    status: LocationStatus,
    coordinate: Option<Coordinate>,
}

impl LocationResolver {
    #[must_use]
    pub const fn new(fallback: Coordinate, timeout: Duration) -> Self {
        Self {
            fallback,
            timeout,
            attempt: 0,
            status: LocationStatus::Idle,
            coordinate: None,
        }
    }

    /// Starts a new attempt unless one is already in flight.
    ///
    /// The last settled coordinate stays readable while the new attempt runs.
    pub fn resolve(&mut self) -> Option<PositionRequest> {
        if self.status == LocationStatus::Resolving {
            tracing::debug!(attempt = self.attempt, "location already resolving");
            return None;
        }

        self.attempt += 1;
        self.status = LocationStatus::Resolving;
        tracing::debug!(attempt = self.attempt, timeout_ms = self.timeout.as_millis() as u64, "resolving location");

        Some(PositionRequest {
            attempt: self.attempt,
            timeout: self.timeout,
            high_accuracy: true,
        })
    }

    /// The platform reported a position for `attempt`.
    pub fn on_position(&mut self, attempt: u64, coordinate: Coordinate) -> Option<Resolution> {
        if !self.accepts(attempt) {
            return None;
        }

        tracing::info!(attempt, %coordinate, "location resolved");
        Some(self.settle(coordinate, LocationStatus::Resolved))
    }

    /// The platform refused or could not answer `attempt`.
    pub fn on_failure(&mut self, attempt: u64, failure: LocationFailure) -> Option<Resolution> {
        if !self.accepts(attempt) {
            return None;
        }

        tracing::warn!(attempt, reason = %failure, fallback = %self.fallback, "location unavailable, using fallback");
        Some(self.settle(self.fallback, LocationStatus::Unavailable(failure)))
    }

    /// The timeout armed for `attempt` elapsed.
    pub fn on_timeout(&mut self, attempt: u64) -> Option<Resolution> {
        self.on_failure(attempt, LocationFailure::Timeout)
    }

    #[must_use]
    pub const fn status(&self) -> &LocationStatus {
        &self.status
    }

    /// Last settled coordinate, `None` before the first attempt settles.
    #[must_use]
    pub const fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    #[must_use]
    pub const fn fallback(&self) -> Coordinate {
        self.fallback
    }

    #[must_use]
    pub const fn current_attempt(&self) -> u64 {
        self.attempt
    }

    fn accepts(&self, attempt: u64) -> bool {
        let live = attempt == self.attempt && self.status == LocationStatus::Resolving;
        if !live {
            tracing::debug!(attempt, current = self.attempt, "ignoring stale location callback");
        }
        live
    }

    fn settle(&mut self, coordinate: Coordinate, status: LocationStatus) -> Resolution {
        self.coordinate = Some(coordinate);
        self.status = status.clone();
        Resolution { coordinate, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_FALLBACK;

    fn resolver() -> LocationResolver {
        LocationResolver::new(DEFAULT_FALLBACK, DEFAULT_LOCATION_TIMEOUT)
    }

    #[test]
    fn success_reports_resolved() {
        let mut r = resolver();
        let req = r.resolve().unwrap();
        assert!(req.high_accuracy);
        assert_eq!(req.timeout, Duration::from_secs(5));

        let here = Coordinate::new(48.85, 2.35).unwrap();
        let res = r.on_position(req.attempt, here).unwrap();
        assert_eq!(res.coordinate, here);
        assert_eq!(r.status(), &LocationStatus::Resolved);
    }

    #[test]
    fn every_failure_yields_the_configured_fallback() {
        let fallback = Coordinate::new(51.5, -0.12).unwrap();
        for failure in [
            LocationFailure::PermissionDenied,
            LocationFailure::CapabilityMissing,
            LocationFailure::Timeout,
            LocationFailure::Malformed("nope".into()),
        ] {
            let mut r = LocationResolver::new(fallback, DEFAULT_LOCATION_TIMEOUT);
            let req = r.resolve().unwrap();
            let res = r.on_failure(req.attempt, failure.clone()).unwrap();
            assert_eq!(res.coordinate, fallback);
            assert_eq!(r.coordinate(), Some(fallback));
            assert_eq!(r.status(), &LocationStatus::Unavailable(failure));
        }
    }

    #[test]
    fn only_one_active_request() {
        let mut r = resolver();
        assert!(r.resolve().is_some());
        assert!(r.resolve().is_none());
    }

    #[test]
    fn timeout_after_success_is_ignored() {
        let mut r = resolver();
        let req = r.resolve().unwrap();
        let here = Coordinate::new(10.0, 10.0).unwrap();
        r.on_position(req.attempt, here);

        assert!(r.on_timeout(req.attempt).is_none());
        assert_eq!(r.coordinate(), Some(here));
        assert_eq!(r.status(), &LocationStatus::Resolved);
    }

    #[test]
    fn late_answer_for_previous_attempt_is_ignored() {
        let mut r = resolver();
        let first = r.resolve().unwrap();
        r.on_timeout(first.attempt);

        let second = r.resolve().unwrap();
        assert!(r.on_position(first.attempt, Coordinate::new(1.0, 1.0).unwrap()).is_none());
        assert_eq!(r.status(), &LocationStatus::Resolving);

        let here = Coordinate::new(2.0, 2.0).unwrap();
        assert!(r.on_position(second.attempt, here).is_some());
        assert_eq!(r.coordinate(), Some(here));
    }
}
