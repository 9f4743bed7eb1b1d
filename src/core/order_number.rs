//! Human-readable order reference generation.
//!
//! Order numbers look like `OCH-20250601-K3R9QZ`: a fixed prefix, the
//! creation date, and six random uppercase alphanumerics. Uniqueness is
//! enforced by the database; `core::booking` regenerates on the rare
//! suffix collision.

use chrono::NaiveDate;
use rand::Rng;
use rand::distributions::Alphanumeric;

const PREFIX: &str = "OCH";
const SUFFIX_LEN: usize = 6;

/// Generates a fresh order number for the given creation date.
#[must_use]
pub fn generate(date: NaiveDate) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("{PREFIX}-{}-{suffix}", date.format("%Y%m%d"))
}

/// Returns `true` if `value` matches `OCH-<8 digits>-<6 uppercase alphanumerics>`.
#[must_use]
pub fn is_well_formed(value: &str) -> bool {
    let mut parts = value.splitn(3, '-');
    let (Some(prefix), Some(date), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == PREFIX
        && date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
