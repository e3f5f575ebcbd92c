use sha2::{Digest, Sha256};
use time::macros::format_description;
use time::OffsetDateTime;

/// Number of lowercase hex characters kept from the digest. 96 bits, ample
/// collision resistance for the id space this service will ever see.
pub const TOKEN_LEN: usize = 24;

/// Derive the one-time confirmation token for a registration.
///
/// Deterministic for identical (email, timestamp) inputs; practically unique
/// in production because the timestamp carries microsecond resolution. The
/// digest is one-way, so the token reveals neither the email nor the
/// registration time.
pub fn confirmation_token(email: &str, now: OffsetDateTime) -> String {
    let ts = now
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6][offset_hour sign:mandatory]:[offset_minute]"
        ))
        .expect("format token timestamp");

    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(ts.as_bytes());
    let digest = hasher.finalize();

    let mut token = hex::encode(digest);
    token.truncate(TOKEN_LEN);
    token
}
