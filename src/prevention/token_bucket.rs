// src/prevention/token_bucket.rs
//! Rate limit for push-back corrections.
//!
//! Every push-back spends one token. Tokens refill continuously; when the bucket
//! runs dry the player has been held against geometry for too long and the
//! engine escalates to a rewind that actually relocates them.

use crate::config::PushBackOverrideConfig;

/// Tokens spent by a single push-back.
pub const PUSH_BACK_COST: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBucket {
    tokens: f32,
    max_tokens: f32,
    refill_per_second: f32,
}

impl TokenBucket {
    /// Starts full.
    pub fn new(max_tokens: f32, refill_per_second: f32) -> Self {
        let max_tokens = max_tokens.max(0.0);
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_per_second: refill_per_second.max(0.0),
        }
    }

    pub fn from_config(config: &PushBackOverrideConfig) -> Self {
        Self::new(config.max_tokens, config.refill_per_sec)
    }

    pub fn tokens(&self) -> f32 {
        self.tokens
    }

    pub fn max_tokens(&self) -> f32 {
        self.max_tokens
    }

    /// Pick up changed limits without losing the current fill level.
    pub fn reconfigure(&mut self, config: &PushBackOverrideConfig) {
        self.max_tokens = config.max_tokens.max(0.0);
        self.refill_per_second = config.refill_per_sec.max(0.0);
        self.tokens = self.tokens.min(self.max_tokens);
    }

    /// Add tokens for `elapsed` seconds; overflow is discarded.
    pub fn refill(&mut self, elapsed: f32) {
        if elapsed <= 0.0 {
            return;
        }
        self.tokens = (self.tokens + self.refill_per_second * elapsed).min(self.max_tokens);
    }

    /// Spend `cost` tokens. Leaves the bucket untouched and returns false if there are not enough.
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if self.tokens < cost {
            return false;
        }
        self.tokens -= cost;
        true
    }

    pub fn fill(&mut self) {
        self.tokens = self.max_tokens;
    }
}
