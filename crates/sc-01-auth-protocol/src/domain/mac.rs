//! # MAC Engine
//!
//! HMAC-SHA512 over canonical strings, hex-encoded lowercase.
//!
//! ## Security
//!
//! - Verification compares in constant time via `subtle::ConstantTimeEq`;
//!   only the length check short-circuits
//! - The recomputed tag is wiped after comparison and is never returned,
//!   logged or embedded in an error

use crate::domain::entities::SharedKey;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// Length of a hex-encoded HMAC-SHA512 tag.
pub const TAG_HEX_LEN: usize = 128;

/// Lowercase hex HMAC-SHA512 of `message` under `key`.
pub fn compute(key: &SharedKey, message: &str) -> String {
    let mut mac =
        HmacSha512::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Returns `true` iff `candidate` is exactly the tag [`compute`] yields.
///
/// The comparison is over the hex text as submitted: uppercase hex does not
/// verify.
pub fn verify(key: &SharedKey, message: &str, candidate: &str) -> bool {
    let mut expected = compute(key, message);
    let matches = expected.len() == candidate.len()
        && bool::from(expected.as_bytes().ct_eq(candidate.as_bytes()));
    expected.zeroize();
    matches
}
