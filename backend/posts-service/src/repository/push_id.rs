//! Path addressing and key generation for the hierarchical store.
//!
//! A [`NodePath`] is a `/`-joined list of key segments. New children get
//! push ids: 8 characters of millisecond timestamp followed by 12 random
//! characters, all drawn from a 64-symbol alphabet whose ASCII order matches
//! its numeric order, so ids sort lexicographically by creation time.

use rand::Rng;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIMESTAMP_LEN: usize = 8;
const RANDOM_LEN: usize = 12;

/// Length of every generated push id
pub const PUSH_ID_LEN: usize = TIMESTAMP_LEN + RANDOM_LEN;

const MAX_KEY_BYTES: usize = 768;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidKey {
    #[error("key segment is empty")]
    Empty,
    #[error("key segment exceeds {MAX_KEY_BYTES} bytes")]
    TooLong,
    #[error("key segment contains forbidden character {0:?}")]
    Forbidden(char),
}

/// Check one path segment against the store's key rules
pub fn validate_key(key: &str) -> Result<(), InvalidKey> {
    if key.is_empty() {
        return Err(InvalidKey::Empty);
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(InvalidKey::TooLong);
    }
    match key
        .chars()
        .find(|&c| matches!(c, '.' | '$' | '#' | '[' | ']' | '/') || c.is_ascii_control())
    {
        Some(c) => Err(InvalidKey::Forbidden(c)),
        None => Ok(()),
    }
}

/// Location of a node, e.g. `posts/-NxA1b2c3d4e5f6g7h8i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// Parse a slash separated path; leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> Result<Self, InvalidKey> {
        let segments = path
            .trim_matches('/')
            .split('/')
            .map(|segment| validate_key(segment).map(|_| segment.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn child(&self, key: &str) -> Result<Self, InvalidKey> {
        validate_key(key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    /// Last segment of the path
    pub fn key(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_millis: u64,
    last_random: [u8; RANDOM_LEN],
}

/// Monotonic push id generator, safe to share across tasks
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    state: Mutex<GeneratorState>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now, &mut rand::thread_rng())
    }

    /// Generate an id for `now_millis`; never returns an id that sorts at or
    /// before a previously returned one, even if the clock steps backwards.
    fn next_at<R: Rng>(&self, now_millis: u64, rng: &mut R) -> String {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut millis = now_millis;
        if millis > state.last_millis {
            for slot in state.last_random.iter_mut() {
                *slot = rng.gen_range(0..64);
            }
        } else {
            millis = state.last_millis;
            if !increment(&mut state.last_random) {
                // Suffix space for this millisecond is exhausted.
                millis += 1;
                for slot in state.last_random.iter_mut() {
                    *slot = rng.gen_range(0..64);
                }
            }
        }
        state.last_millis = millis;

        let mut id = [0u8; PUSH_ID_LEN];
        let mut remaining = millis;
        for slot in id[..TIMESTAMP_LEN].iter_mut().rev() {
            *slot = PUSH_CHARS[(remaining % 64) as usize];
            remaining /= 64;
        }
        for (slot, value) in id[TIMESTAMP_LEN..].iter_mut().zip(state.last_random.iter()) {
            *slot = PUSH_CHARS[*value as usize];
        }

        id.iter().map(|b| char::from(*b)).collect()
    }
}

/// Base-64 increment of the random suffix; false on overflow
fn increment(digits: &mut [u8; RANDOM_LEN]) -> bool {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return true;
        }
    }
    false
}
