//! Accounts: the `users` table, credential checks and password hashing.

use std::fmt;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::http::StatusCode;
use chrono::Utc;
use rand_core::OsRng;
use sea_orm::{ActiveValue, QueryFilter, entity::prelude::*};
use thiserror::Error;
use uuid::Uuid;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Min 6 characters")]
    WeakPassword,
    #[error("Email already registered")]
    EmailTaken,
    #[error("No account for this email")]
    UnknownUser,
    #[error("Wrong password")]
    WrongPassword,
    #[error("could not process password")]
    Hash(String),
}

impl AuthError {
    /// The form field the error belongs to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::NameRequired => Some("name"),
            Self::EmailRequired | Self::InvalidEmail | Self::UnknownUser => Some("email"),
            Self::WeakPassword | Self::WrongPassword => Some("password"),
            Self::EmailTaken | Self::Hash(_) => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NameRequired | Self::EmailRequired | Self::InvalidEmail | Self::WeakPassword => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::UnknownUser | Self::WrongPassword => StatusCode::UNAUTHORIZED,
            Self::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every problem found in a signup or login form, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<AuthError>);

impl FormErrors {
    pub fn errors(&self) -> &[AuthError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn check<T>(&mut self, result: Result<T, AuthError>) -> Option<T> {
        result.map_err(|err| self.0.push(err)).ok()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FormErrors {}

impl From<AuthError> for FormErrors {
    fn from(value: AuthError) -> Self {
        Self(vec![value])
    }
}

/// Trims and lowercases an email, rejecting anything not shaped `x@y.z`.
pub fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(AuthError::EmailRequired);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    let dotted = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if local.is_empty() || !dotted {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email.to_lowercase())
}

pub fn check_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

fn check_name(name: &str) -> Result<&str, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::NameRequired);
    }
    Ok(name)
}

/// Checks a signup form, collecting every field error. Returns the trimmed
/// name and the normalized email.
pub fn check_signup<'a>(
    name: &'a str,
    email: &str,
    password: &str,
) -> Result<(&'a str, String), FormErrors> {
    let mut errors = FormErrors::default();
    let name = errors.check(check_name(name));
    let email = errors.check(normalize_email(email));
    errors.check(check_password(password));
    match (name, email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok((name, email)),
        _ => Err(errors),
    }
}

/// Checks a login form, collecting every field error. Returns the
/// normalized email.
pub fn check_login(email: &str, password: &str) -> Result<String, FormErrors> {
    let mut errors = FormErrors::default();
    let email = errors.check(normalize_email(email));
    errors.check(check_password(password));
    match email {
        Some(email) if errors.is_empty() => Ok(email),
        _ => Err(errors),
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|err| AuthError::Hash(err.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::WrongPassword)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, DbErr> {
    Entity::find().filter(Column::Email.eq(email)).one(db).await
}

/// Error of [`register`] and [`authenticate`].
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Form(#[from] FormErrors),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Validates the signup form and stores a new account.
pub async fn register(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Model, AccountError> {
    let (name, email) = check_signup(name, email, password)?;

    if find_by_email(db, &email).await?.is_some() {
        return Err(AuthError::EmailTaken.into());
    }

    let user = ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        name: ActiveValue::Set(name.to_string()),
        email: ActiveValue::Set(email),
        password_hash: ActiveValue::Set(hash_password(password)?),
        created_at: ActiveValue::Set(Utc::now()),
    };
    let user = user.insert(db).await?;
    tracing::info!("registered user {}", user.id);
    Ok(user)
}

/// Checks an email/password pair against the stored hash.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Model, AccountError> {
    let email = check_login(email, password)?;

    let user = find_by_email(db, &email)
        .await?
        .ok_or(AuthError::UnknownUser)?;
    verify_password(password, &user.password_hash)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(
            normalize_email("  Priya@Example.COM ").unwrap(),
            "priya@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert_eq!(normalize_email(" "), Err(AuthError::EmailRequired));
        for raw in ["priya", "priya@example", "@example.com", "priya@.com", "priya@example.", "a b@c.d"] {
            assert_eq!(normalize_email(raw), Err(AuthError::InvalidEmail), "{raw}");
        }
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert_eq!(check_password("12345"), Err(AuthError::WeakPassword));
        assert_eq!(check_password("123456"), Ok(()));
    }

    #[test]
    fn signup_form_reports_every_field() {
        let errors = check_signup("  ", "bad", "1").unwrap_err();
        assert_eq!(
            errors.errors(),
            &[AuthError::NameRequired, AuthError::InvalidEmail, AuthError::WeakPassword]
        );
        assert_eq!(
            errors.to_string(),
            "Name is required, Invalid email, Min 6 characters"
        );

        let (name, email) = check_signup(" Priya ", "Priya@Example.com", "s3cret!").unwrap();
        assert_eq!(name, "Priya");
        assert_eq!(email, "priya@example.com");
    }

    #[test]
    fn login_form_reports_email_and_password() {
        let errors = check_login("", "123").unwrap_err();
        assert_eq!(
            errors.errors(),
            &[AuthError::EmailRequired, AuthError::WeakPassword]
        );
        assert_eq!(check_login("a@b.co", "123456").unwrap(), "a@b.co");
    }

    #[test]
    fn hashes_verify_only_their_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_eq!(verify_password("correct horse", &hash), Ok(()));
        assert_eq!(
            verify_password("battery staple", &hash),
            Err(AuthError::WrongPassword)
        );
    }
}
