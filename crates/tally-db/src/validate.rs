//! Field-level rules for the data model. A failed rule surfaces as
//! [`StoreError::Validation`] and nothing reaches the store.

use crate::{Result, StoreError};

/// Minimum plaintext length, checked before hashing.
pub const MIN_PASSWORD_LEN: usize = 4;

pub fn username(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation {
            field: "username",
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

/// Syntactic check only: a non-empty local part, an `@`, and a dotted
/// domain. Anything stricter belongs to a confirmation email, not here.
pub fn email(value: &str) -> Result<()> {
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !value.contains(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if well_formed {
        Ok(())
    } else {
        Err(StoreError::Validation {
            field: "email",
            message: format!("'{value}' is not a valid email address"),
        })
    }
}

pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(StoreError::Validation {
            field: "password",
            message: format!("must be at least {MIN_PASSWORD_LEN} characters"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(email("lernantino@example.com").is_ok());
        assert!(email("a@b.co").is_ok());

        assert!(email("not-an-email").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("user@nodot").is_err());
        assert!(email("user@.com").is_err());
        assert!(email("user name@example.com").is_err());
    }

    #[test]
    fn password_minimum_is_four() {
        assert!(password("abc").is_err());
        assert!(password("abcd").is_ok());
    }

    #[test]
    fn username_must_be_non_empty() {
        assert!(username("").is_err());
        assert!(username("   ").is_err());
        assert!(username("lernantino").is_ok());
    }
}
