use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Moderator,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Moderator => "MODERATOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Role::Student),
            "MODERATOR" => Ok(Role::Moderator),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("sign in required")]
    SignedOut,

    #[error("{actual} cannot open a page reserved for {required}")]
    Forbidden { required: Role, actual: Role },
}

/// Identity supplied by whoever launched the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    email: String,
    role: Role,
}

impl SessionContext {
    /// Returns `None` for a blank email, which counts as signed out.
    #[must_use]
    pub fn new(email: impl Into<String>, role: Role) -> Option<Self> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return None;
        }
        Some(Self { email, role })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}

/// Check that a visitor holds exactly `required`.
///
/// # Errors
///
/// Returns `AccessError::SignedOut` without a context and
/// `AccessError::Forbidden` on a role mismatch.
pub fn authorize(
    context: Option<&SessionContext>,
    required: Role,
) -> Result<&SessionContext, AccessError> {
    let context = context.ok_or(AccessError::SignedOut)?;
    if context.role != required {
        return Err(AccessError::Forbidden {
            required,
            actual: context.role,
        });
    }
    Ok(context)
}
