use chrono::{DateTime, Duration, Utc};

/// Consecutive failures allowed before an account is suspended, and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    threshold: u32,
    duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(5, Duration::minutes(15))
    }
}

/// Persisted login counters for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoginState {
    pub failed_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Locked { until: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    pub state: LoginState,
    /// This failure armed the lock
    pub locked: bool,
}

impl LockoutPolicy {
    pub fn new(threshold: u32, duration: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            duration,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Locked while `locked_until` is strictly in the future
    pub fn status(&self, state: &LoginState, now: DateTime<Utc>) -> AccountStatus {
        match state.locked_until {
            Some(until) if until > now => AccountStatus::Locked { until },
            _ => AccountStatus::Active,
        }
    }

    /// Count a wrong password. Reaching the threshold arms the lock and clears the counter.
    pub fn register_failure(&self, state: &LoginState, now: DateTime<Utc>) -> FailureOutcome {
        let attempts = state.failed_attempts.max(0) + 1;
        if attempts >= self.threshold as i32 {
            FailureOutcome {
                state: LoginState {
                    failed_attempts: 0,
                    locked_until: Some(now + self.duration),
                },
                locked: true,
            }
        } else {
            FailureOutcome {
                state: LoginState {
                    failed_attempts: attempts,
                    locked_until: None,
                },
                locked: false,
            }
        }
    }

    pub fn register_success(&self) -> LoginState {
        LoginState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn counts_failures_below_threshold() {
        let policy = LockoutPolicy::default();
        let mut state = LoginState::default();
        for expected in 1..5 {
            let outcome = policy.register_failure(&state, now());
            assert!(!outcome.locked);
            assert_eq!(outcome.state.failed_attempts, expected);
            assert_eq!(outcome.state.locked_until, None);
            state = outcome.state;
        }
    }

    #[test]
    fn fifth_failure_locks_and_resets_counter() {
        let policy = LockoutPolicy::default();
        let state = LoginState { failed_attempts: 4, locked_until: None };
        let outcome = policy.register_failure(&state, now());
        assert!(outcome.locked);
        assert_eq!(outcome.state.failed_attempts, 0);
        assert_eq!(outcome.state.locked_until, Some(now() + Duration::minutes(15)));
        assert_eq!(
            policy.status(&outcome.state, now()),
            AccountStatus::Locked { until: now() + Duration::minutes(15) }
        );
    }

    #[test]
    fn lock_expires() {
        let policy = LockoutPolicy::default();
        let state = LoginState { failed_attempts: 0, locked_until: Some(now()) };
        assert_eq!(policy.status(&state, now()), AccountStatus::Active);
        assert!(matches!(
            policy.status(&state, now() - Duration::seconds(1)),
            AccountStatus::Locked { .. }
        ));
    }

    #[test]
    fn failure_after_expired_lock_starts_new_count() {
        let policy = LockoutPolicy::default();
        let state = LoginState {
            failed_attempts: 0,
            locked_until: Some(now() - Duration::minutes(1)),
        };
        let outcome = policy.register_failure(&state, now());
        assert_eq!(outcome.state, LoginState { failed_attempts: 1, locked_until: None });
    }

    #[test]
    fn success_clears_everything() {
        let policy = LockoutPolicy::new(3, Duration::minutes(1));
        assert_eq!(policy.register_success(), LoginState::default());
    }

    #[test]
    fn threshold_of_zero_behaves_as_one() {
        let policy = LockoutPolicy::new(0, Duration::minutes(1));
        assert!(policy.register_failure(&LoginState::default(), now()).locked);
    }
}
