// SPDX-License-Identifier: MIT

//! Classification helpers for Postgres constraint-violation errors
//!
//! Used by callers that persist through the same database; the cleanup
//! core itself never consults these.

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
const PRIMARY_KEY_PREFIX: &str = "pk_";
const PRIMARY_KEY_SUFFIX: &str = "_pkey";

/// True when the error code and constraint name describe a primary-key
/// violation (a unique violation on a `pk_`-prefixed or `_pkey`-suffixed
/// constraint). Comparisons are case-insensitive.
#[must_use]
pub fn is_primary_key_violation(code: &str, constraint: Option<&str>) -> bool {
    if !code.eq_ignore_ascii_case(UNIQUE_VIOLATION) {
        return false;
    }
    constraint.is_some_and(|name| {
        let name = name.to_ascii_lowercase();
        name.starts_with(PRIMARY_KEY_PREFIX) || name.ends_with(PRIMARY_KEY_SUFFIX)
    })
}

/// True when the error is a unique violation on exactly the named
/// constraint (case-insensitive)
#[must_use]
pub fn is_unique_constraint_violation(
    code: &str,
    constraint: Option<&str>,
    expected_constraint: &str,
) -> bool {
    code.eq_ignore_ascii_case(UNIQUE_VIOLATION)
        && constraint.is_some_and(|name| name.eq_ignore_ascii_case(expected_constraint))
}

/// Applies [`is_primary_key_violation`] to a driver error
#[must_use]
pub fn error_is_primary_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| {
        is_primary_key_violation(db.code().as_deref().unwrap_or_default(), db.constraint())
    })
}

/// Applies [`is_unique_constraint_violation`] to a driver error
#[must_use]
pub fn error_is_unique_constraint_violation(e: &sqlx::Error, expected_constraint: &str) -> bool {
    e.as_database_error().is_some_and(|db| {
        is_unique_constraint_violation(
            db.code().as_deref().unwrap_or_default(),
            db.constraint(),
            expected_constraint,
        )
    })
}
