use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
}

/// Public projection of a user returned by the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Exact-match lookup over user columns. Set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub session_id: Option<String>,
    pub reset_token: Option<String>,
}

impl UserFilter {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn by_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn by_reset_token(reset_token: impl Into<String>) -> Self {
        Self {
            reset_token: Some(reset_token.into()),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.email.is_none()
            && self.session_id.is_none()
            && self.reset_token.is_none()
    }
}

/// A single column assignment applied by `UserRepository::update_user`.
#[derive(Debug, Clone, PartialEq)]
pub enum UserChange {
    Email(String),
    HashedPassword(String),
    SessionId(Option<String>),
    ResetToken(Option<String>),
}

impl UserChange {
    pub fn column(&self) -> &'static str {
        match self {
            UserChange::Email(_) => "email",
            UserChange::HashedPassword(_) => "hashed_password",
            UserChange::SessionId(_) => "session_id",
            UserChange::ResetToken(_) => "reset_token",
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            UserChange::Email(v) | UserChange::HashedPassword(v) => Some(v),
            UserChange::SessionId(v) | UserChange::ResetToken(v) => v,
        }
    }

    /// Build a change from an untyped field name.
    ///
    /// Returns `None` when the field is not an updatable attribute of `User`.
    /// `email` and `hashed_password` are non-nullable, so an absent value is
    /// rejected for them as well.
    pub fn parse(field: &str, value: Option<String>) -> Option<Self> {
        match (field, value) {
            ("email", Some(v)) => Some(UserChange::Email(v)),
            ("hashed_password", Some(v)) => Some(UserChange::HashedPassword(v)),
            ("session_id", v) => Some(UserChange::SessionId(v)),
            ("reset_token", v) => Some(UserChange::ResetToken(v)),
            _ => None,
        }
    }
}
