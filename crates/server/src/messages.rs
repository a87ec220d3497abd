//! Wording of authentication failures.
//!
//! The local backend reports exactly what went wrong, the database backend
//! answers every credential problem the same way. Either can be selected in
//! the settings.

use engine::StoreKind;
use serde::Deserialize;

use crate::AuthError;

const GENERIC_MESSAGE: &str = "Authentication failed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
    /// "Email already registered", "Wrong password", ...
    Specific,
    /// "Authentication failed" for every credential problem.
    Generic,
}

impl MessageStyle {
    /// Style used when the settings do not pick one.
    pub fn default_for(kind: StoreKind) -> Self {
        match kind {
            StoreKind::Local | StoreKind::Memory => Self::Specific,
            StoreKind::Database => Self::Generic,
        }
    }

    /// Message shown for `err`. Form validation errors are always specific.
    pub fn message(self, err: &AuthError) -> String {
        match (self, err) {
            (
                Self::Generic,
                AuthError::EmailTaken | AuthError::UnknownUser | AuthError::WrongPassword,
            ) => GENERIC_MESSAGE.to_string(),
            _ => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_backend() {
        assert_eq!(MessageStyle::default_for(StoreKind::Local), MessageStyle::Specific);
        assert_eq!(MessageStyle::default_for(StoreKind::Database), MessageStyle::Generic);
    }

    #[test]
    fn generic_hides_credential_details() {
        let style = MessageStyle::Generic;
        assert_eq!(style.message(&AuthError::WrongPassword), GENERIC_MESSAGE);
        assert_eq!(style.message(&AuthError::UnknownUser), GENERIC_MESSAGE);
        assert_eq!(style.message(&AuthError::EmailTaken), GENERIC_MESSAGE);
        assert_eq!(style.message(&AuthError::InvalidEmail), "Invalid email");
    }

    #[test]
    fn specific_names_the_problem() {
        let style = MessageStyle::Specific;
        assert_eq!(style.message(&AuthError::WrongPassword), "Wrong password");
        assert_eq!(style.message(&AuthError::UnknownUser), "No account for this email");
        assert_eq!(style.message(&AuthError::EmailTaken), "Email already registered");
    }
}
