// src/services/rate_limiter.rs
// DOCUMENTATION: Fixed per-route request throttles
// PURPOSE: Limit auth endpoints per IP and general API usage per user or IP
//
//   auth/ip          register + login           per IP    5/min
//   auth/refresh/ip  POST refresh               per IP   10/min
//   api/user         /api/v1/* authenticated    per user 100/min
//   api/ip           /api/v1/* anonymous        per IP   60/min

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const API_PREFIX: &str = "/api/v1/";

/// What a throttle needs to know about a request
#[derive(Debug, Clone)]
pub struct ThrottleRequest<'a> {
    pub path: &'a str,
    pub is_post: bool,
    pub ip: &'a str,
    /// Set when the request carries a decodable access token
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    AuthCredentials,
    AuthRefresh,
    ApiUser,
    ApiIp,
}

impl Scope {
    /// Discriminator for this rule, or None when the rule does not apply
    fn key(&self, req: &ThrottleRequest<'_>) -> Option<String> {
        match self {
            Scope::AuthCredentials => {
                let matches = req.path.starts_with("/api/v1/auth/register")
                    || req.path.starts_with("/api/v1/auth/login");
                matches.then(|| req.ip.to_string())
            }
            Scope::AuthRefresh => (req.path.starts_with("/api/v1/auth/refresh") && req.is_post)
                .then(|| req.ip.to_string()),
            Scope::ApiUser => {
                if req.path.starts_with(API_PREFIX) {
                    req.user_id.map(|id| id.to_string())
                } else {
                    None
                }
            }
            Scope::ApiIp => (req.path.starts_with(API_PREFIX) && req.user_id.is_none())
                .then(|| req.ip.to_string()),
        }
    }
}

struct Throttle {
    name: &'static str,
    scope: Scope,
    limiter: DefaultKeyedRateLimiter<String>,
}

/// Rejection details for a throttled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throttled {
    pub rule: &'static str,
    pub retry_after_seconds: u64,
}

pub struct RequestThrottle {
    enabled: bool,
    throttles: Vec<Throttle>,
    clock: DefaultClock,
}

impl RequestThrottle {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            throttles: vec![
                throttle("auth/ip", Scope::AuthCredentials, 5),
                throttle("auth/refresh/ip", Scope::AuthRefresh, 10),
                throttle("api/user", Scope::ApiUser, 100),
                throttle("api/ip", Scope::ApiIp, 60),
            ],
            clock: DefaultClock::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count the request against every matching rule; the first exhausted rule wins
    pub fn check(&self, req: &ThrottleRequest<'_>) -> Result<(), Throttled> {
        if !self.enabled {
            return Ok(());
        }

        for throttle in &self.throttles {
            let Some(key) = throttle.scope.key(req) else {
                continue;
            };

            if let Err(not_until) = throttle.limiter.check_key(&key) {
                let wait = not_until.wait_time_from(self.clock.now());
                return Err(Throttled {
                    rule: throttle.name,
                    retry_after_seconds: ceil_secs(wait),
                });
            }
        }

        Ok(())
    }

    /// Forget keys whose limits have fully replenished
    pub fn prune(&self) {
        for throttle in &self.throttles {
            throttle.limiter.retain_recent();
            throttle.limiter.shrink_to_fit();
        }
    }
}

fn throttle(name: &'static str, scope: Scope, per_minute: u32) -> Throttle {
    let limit = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    Throttle {
        name,
        scope,
        limiter: RateLimiter::keyed(Quota::per_minute(limit)),
    }
}

fn ceil_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

/// Periodically drop idle limiter keys so memory stays bounded
pub fn start_prune_task(throttle: Arc<RequestThrottle>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            throttle.prune();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(path: &'a str, ip: &'a str, user_id: Option<i64>) -> ThrottleRequest<'a> {
        ThrottleRequest {
            path,
            is_post: true,
            ip,
            user_id,
        }
    }

    #[test]
    fn test_login_limited_per_ip() {
        let throttle = RequestThrottle::new(true);
        let login = request("/api/v1/auth/login", "10.0.0.1", None);

        for _ in 0..5 {
            assert!(throttle.check(&login).is_ok());
        }

        let rejected = throttle.check(&login).unwrap_err();
        assert_eq!(rejected.rule, "auth/ip");
        assert!(rejected.retry_after_seconds >= 1);

        // Other clients are unaffected
        assert!(throttle
            .check(&request("/api/v1/auth/login", "10.0.0.2", None))
            .is_ok());
    }

    #[test]
    fn test_register_and_login_share_a_bucket() {
        let throttle = RequestThrottle::new(true);
        for _ in 0..3 {
            assert!(throttle
                .check(&request("/api/v1/auth/register", "10.0.0.1", None))
                .is_ok());
        }
        for _ in 0..2 {
            assert!(throttle
                .check(&request("/api/v1/auth/login", "10.0.0.1", None))
                .is_ok());
        }
        assert!(throttle
            .check(&request("/api/v1/auth/login", "10.0.0.1", None))
            .is_err());
    }

    #[test]
    fn test_refresh_only_counts_posts() {
        let throttle = RequestThrottle::new(true);
        let mut refresh = request("/api/v1/auth/refresh", "10.0.0.1", None);

        for _ in 0..10 {
            assert!(throttle.check(&refresh).is_ok());
        }
        assert_eq!(throttle.check(&refresh).unwrap_err().rule, "auth/refresh/ip");

        refresh.is_post = false;
        let scope = Scope::AuthRefresh;
        assert_eq!(scope.key(&refresh), None);
    }

    #[test]
    fn test_authenticated_requests_keyed_by_user() {
        let throttle = RequestThrottle::new(true);

        for _ in 0..100 {
            assert!(throttle
                .check(&request("/api/v1/photos", "10.0.0.1", Some(1)))
                .is_ok());
        }
        let rejected = throttle
            .check(&request("/api/v1/photos", "10.0.0.9", Some(1)))
            .unwrap_err();
        assert_eq!(rejected.rule, "api/user");

        // Same IP, different user
        assert!(throttle
            .check(&request("/api/v1/photos", "10.0.0.1", Some(2)))
            .is_ok());
    }

    #[test]
    fn test_anonymous_requests_keyed_by_ip() {
        let throttle = RequestThrottle::new(true);
        for _ in 0..60 {
            assert!(throttle
                .check(&request("/api/v1/photos", "10.0.0.1", None))
                .is_ok());
        }
        assert_eq!(
            throttle
                .check(&request("/api/v1/photos", "10.0.0.1", None))
                .unwrap_err()
                .rule,
            "api/ip"
        );
    }

    #[test]
    fn test_paths_outside_api_are_not_limited() {
        let throttle = RequestThrottle::new(true);
        for _ in 0..200 {
            assert!(throttle.check(&request("/up", "10.0.0.1", None)).is_ok());
        }
    }

    #[test]
    fn test_disabled_throttle_allows_everything() {
        let throttle = RequestThrottle::new(false);
        for _ in 0..20 {
            assert!(throttle
                .check(&request("/api/v1/auth/login", "10.0.0.1", None))
                .is_ok());
        }
        throttle.prune();
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::from_millis(11_500)), 12);
        assert_eq!(ceil_secs(Duration::from_secs(12)), 12);
        assert_eq!(ceil_secs(Duration::ZERO), 1);
    }
}
