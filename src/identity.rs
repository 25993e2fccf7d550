//! Randomized request identities
//!
//! Every search request and every browser launch presents one of a small pool
//! of browser identities. The pool is an injected value rather than global
//! state, so tests can pin it to a single profile or a fixed seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};

/// Accept-Language sent with every request
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36",
];

/// A browser identity presented to the target site
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IdentityProfile {
    /// User-Agent header value
    pub user_agent: String,

    /// Accept-Language header value
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

fn default_accept_language() -> String {
    DEFAULT_ACCEPT_LANGUAGE.to_string()
}

impl IdentityProfile {
    /// Creates a profile with the default Accept-Language
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept_language: default_accept_language(),
        }
    }

    /// The built-in desktop browser profiles
    pub fn defaults() -> Vec<Self> {
        DEFAULT_USER_AGENTS.iter().map(|ua| Self::new(*ua)).collect()
    }
}

/// A pool of identities with its own random source
#[derive(Debug)]
pub struct IdentityPool {
    profiles: Vec<IdentityProfile>,
    rng: Mutex<StdRng>,
}

impl IdentityPool {
    /// Creates a pool seeded from system entropy
    ///
    /// An empty profile list falls back to the built-in defaults.
    pub fn new(profiles: Vec<IdentityProfile>) -> Self {
        Self::with_rng(profiles, StdRng::from_entropy())
    }

    /// Creates a pool with a fixed seed, for reproducible selection
    pub fn seeded(profiles: Vec<IdentityProfile>, seed: u64) -> Self {
        Self::with_rng(profiles, StdRng::seed_from_u64(seed))
    }

    fn with_rng(profiles: Vec<IdentityProfile>, rng: StdRng) -> Self {
        let profiles = if profiles.is_empty() {
            IdentityProfile::defaults()
        } else {
            profiles
        };

        Self {
            profiles,
            rng: Mutex::new(rng),
        }
    }

    /// Picks one profile uniformly at random
    pub fn pick(&self) -> IdentityProfile {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.profiles
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_else(|| IdentityProfile::new(DEFAULT_USER_AGENTS[0]))
    }

    /// Number of profiles in the pool
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the pool holds no profiles
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::new(IdentityProfile::defaults())
    }
}
