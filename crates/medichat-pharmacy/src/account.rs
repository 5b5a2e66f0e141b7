//! Mock user accounts.
//!
//! Passwords are kept as `hex(SHA-256(salt || ":" || password))` with a
//! per-user random salt. Nothing that leaves this module carries either.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use medichat_contracts::error::{MediChatError, MediChatResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// A user as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
}

impl Session {
    pub(crate) fn open(user: PublicUser) -> Self {
        Self {
            user,
            token: format!("mock-session-{}", Uuid::new_v4()),
        }
    }
}

/// A stored account.
pub(crate) struct UserRecord {
    pub(crate) user: PublicUser,
    salt: String,
    password_digest: String,
}

impl UserRecord {
    pub(crate) fn new(id: String, registration: Registration) -> MediChatResult<Self> {
        let email = normalize_email(&registration.email);
        if !email.contains('@') {
            return Err(MediChatError::invalid("email", "Please enter a valid email address."));
        }
        if registration.password.is_empty() {
            return Err(MediChatError::invalid("password", "Please enter a password."));
        }
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(MediChatError::invalid("name", "Please enter your name."));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let password_digest = digest_password(&salt, &registration.password);
        Ok(Self {
            user: PublicUser {
                id,
                email,
                name: name.to_string(),
                phone: registration.phone.trim().to_string(),
            },
            salt,
            password_digest,
        })
    }

    pub(crate) fn password_matches(&self, password: &str) -> bool {
        digest_password(&self.salt, password) == self.password_digest
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: password.to_string(),
            name: "Ada Park".to_string(),
            phone: String::new(),
        }
    }

    #[test]
    fn password_is_salted_and_checked() {
        let a = UserRecord::new("1".to_string(), registration("a@example.com", "secret")).unwrap();
        let b = UserRecord::new("2".to_string(), registration("b@example.com", "secret")).unwrap();

        assert!(a.password_matches("secret"));
        assert!(!a.password_matches("Secret"));
        assert_ne!(a.password_digest, b.password_digest);
        assert_eq!(a.password_digest.len(), 64);
    }

    #[test]
    fn email_is_normalized() {
        let record = UserRecord::new("1".to_string(), registration("  Ada@Example.COM ", "pw")).unwrap();
        assert_eq!(record.user.email, "ada@example.com");
    }

    #[test]
    fn registration_checks() {
        assert!(UserRecord::new("1".to_string(), registration("not-an-email", "pw")).is_err());
        assert!(UserRecord::new("1".to_string(), registration("a@example.com", "")).is_err());
    }

    #[test]
    fn public_user_has_no_secret_fields() {
        let record = UserRecord::new("1".to_string(), registration("a@example.com", "pw")).unwrap();
        let json = serde_json::to_value(Session::open(record.user.clone())).unwrap();

        assert!(json["user"].get("password").is_none());
        assert!(json["user"].get("password_digest").is_none());
        assert!(json["token"].as_str().unwrap().starts_with("mock-session-"));
    }
}
