//! Login name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside letters, digits and `@.+-_`.
    #[error("username may only contain letters, digits and @/./+/-/_ (found {0:?})")]
    InvalidCharacter(char),
}

/// A unique login name.
///
/// Letters and digits (any script) plus `@`, `.`, `+`, `-` and `_`, up to 150
/// characters. Usernames are case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum number of characters in a username.
    pub const MAX_LENGTH: usize = 150;

    /// Parse a `Username`.
    ///
    /// # Errors
    ///
    /// Returns a [`UsernameError`] if the input is empty, too long or holds a
    /// disallowed character.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s.chars().find(|c| !is_username_char(*c)) {
            return Err(UsernameError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Username {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Username {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <String as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Username::parse("felipe_santos").is_ok());
        assert!(Username::parse("joão.silva+loja@x-1").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_long_counts_chars() {
        assert!(Username::parse(&"ã".repeat(150)).is_ok());
        assert!(matches!(
            Username::parse(&"a".repeat(151)),
            Err(UsernameError::TooLong { max: 150 })
        ));
    }

    #[test]
    fn test_parse_rejects_spaces_and_symbols() {
        assert_eq!(
            Username::parse("dois nomes"),
            Err(UsernameError::InvalidCharacter(' '))
        );
        assert_eq!(
            Username::parse("semi;colon"),
            Err(UsernameError::InvalidCharacter(';'))
        );
    }
}
