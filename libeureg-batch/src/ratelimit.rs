use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Caps how often requests leave for the registrar.
///
/// Pending rounds can otherwise fire back to back; a rate of zero disables
/// pacing.
pub struct RequestPacer {
    limiter: Option<Limiter>,
}

impl RequestPacer {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            limiter: NonZeroU32::new(requests_per_second)
                .map(|rate| RateLimiter::direct(Quota::per_second(rate))),
        }
    }

    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
