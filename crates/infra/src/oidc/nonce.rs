//! Random `state` and `nonce` values for authorization requests.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

const RANDOM_BYTES: usize = 32;

/// URL-safe base64 of 32 random bytes (43 characters).
#[must_use]
pub fn generate_state() -> String {
    random_token()
}

/// Same shape as [`generate_state`]; kept separate so the two values are
/// never accidentally shared.
#[must_use]
pub fn generate_nonce() -> String {
    random_token()
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; RANDOM_BYTES] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time comparison of the expected and returned state.
#[must_use]
pub fn state_matches(expected: &str, actual: &str) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    expected.bytes().zip(actual.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
