//! Mocked local credential store.
//!
//! Accounts live in the `users_db` slot and the signed-in user in the
//! `session_user` slot. Identity is the email address alone; there are no
//! passwords.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result, ValidationError};
use crate::storage::{keys, load_json, load_json_opt, save_json, KvStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Fields a user may change on their profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

pub struct AuthStore<S> {
    store: S,
    current: Option<User>,
}

impl<S: KvStore> AuthStore<S> {
    /// Restore the signed-in user, dropping a corrupt session slot.
    pub fn open(store: S) -> Result<Self> {
        let current: Option<User> = load_json_opt(&store, keys::SESSION_USER)?;
        if current.is_none() && store.get(keys::SESSION_USER)?.is_some() {
            store.remove(keys::SESSION_USER)?;
        }
        Ok(Self { store, current })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    /// [`AuthError::EmailTaken`] when the email already has an account.
    pub fn signup(&mut self, name: &str, email: &str, now: DateTime<Utc>) -> Result<&User> {
        let name = name.trim();
        let email = normalize_email(email)?;
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "must not be empty".into(),
            }
            .into());
        }

        let mut users = self.users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::EmailTaken { email }.into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            created_at: now,
            avatar: Some(avatar_url(name)),
        };
        users.push(user.clone());
        save_json(&self.store, keys::USERS_DB, &users)?;
        tracing::info!(user_id = %user.id, "account created");

        self.start_session(user)
    }

    /// Sign in an existing account.
    ///
    /// # Errors
    /// [`AuthError::AccountNotFound`] when no account has this email.
    pub fn login(&mut self, email: &str) -> Result<&User> {
        let email = normalize_email(email)?;
        let user = self
            .users()?
            .into_iter()
            .find(|u| u.email == email)
            .ok_or(AuthError::AccountNotFound { email })?;
        self.start_session(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.current = None;
        self.store.remove(keys::SESSION_USER)
    }

    /// Apply `update` to the signed-in user, in the session and the users db.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<&User> {
        let Some(mut user) = self.current.clone() else {
            return Err(AuthError::NotSignedIn.into());
        };

        let mut users = self.users()?;
        if let Some(email) = update.email {
            let email = normalize_email(&email)?;
            if users.iter().any(|u| u.email == email && u.id != user.id) {
                return Err(AuthError::EmailTaken { email }.into());
            }
            user.email = email;
        }
        if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
            user.name = name.trim().to_string();
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }

        if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
            save_json(&self.store, keys::USERS_DB, &users)?;
        }
        self.start_session(user)
    }

    fn users(&self) -> Result<Vec<User>> {
        load_json(&self.store, keys::USERS_DB)
    }

    fn start_session(&mut self, user: User) -> Result<&User> {
        save_json(&self.store, keys::SESSION_USER, &user)?;
        Ok(&*self.current.insert(user))
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_ascii_lowercase();
    if !email.contains('@') {
        return Err(ValidationError::InvalidValue {
            field: "email".into(),
            message: format!("'{email}' is not an email address"),
        }
        .into());
    }
    Ok(email)
}

fn avatar_url(name: &str) -> String {
    format!(
        "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::CoreError;

    #[test]
    fn signup_then_login() {
        let mem = MemoryStore::new();
        let mut auth = AuthStore::open(&mem).unwrap();
        let id = auth
            .signup("Lan Anh", "Lan@Example.com", Utc::now())
            .unwrap()
            .id
            .clone();
        assert_eq!(auth.current_user().unwrap().email, "lan@example.com");
        assert!(auth
            .current_user()
            .unwrap()
            .avatar
            .as_deref()
            .unwrap()
            .ends_with("seed=Lan%20Anh"));

        auth.logout().unwrap();
        assert!(auth.current_user().is_none());
        assert!(mem.raw(keys::SESSION_USER).is_none());

        assert_eq!(auth.login("lan@example.com").unwrap().id, id);
    }

    #[test]
    fn login_unknown_email_is_a_typed_failure() {
        let mem = MemoryStore::new();
        let mut auth = AuthStore::open(&mem).unwrap();
        let err = auth.login("ghost@example.com").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Auth(AuthError::AccountNotFound { ref email }) if email == "ghost@example.com"
        ));
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn duplicate_signup_is_rejected() {
        let mem = MemoryStore::new();
        let mut auth = AuthStore::open(&mem).unwrap();
        auth.signup("A", "a@example.com", Utc::now()).unwrap();
        let err = auth.signup("B", "a@example.com", Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Auth(AuthError::EmailTaken { .. })));
    }

    #[test]
    fn session_survives_reopen_and_corruption_is_dropped() {
        let mem = MemoryStore::new();
        {
            let mut auth = AuthStore::open(&mem).unwrap();
            auth.signup("A", "a@example.com", Utc::now()).unwrap();
        }
        let auth = AuthStore::open(&mem).unwrap();
        assert_eq!(auth.current_user().unwrap().name, "A");

        mem.set(keys::SESSION_USER, "{broken").unwrap();
        let auth = AuthStore::open(&mem).unwrap();
        assert!(auth.current_user().is_none());
        assert!(mem.raw(keys::SESSION_USER).is_none());
    }

    #[test]
    fn update_profile_writes_through_to_users_db() {
        let mem = MemoryStore::new();
        let mut auth = AuthStore::open(&mem).unwrap();
        assert!(matches!(
            auth.update_profile(ProfileUpdate::default()),
            Err(CoreError::Auth(AuthError::NotSignedIn))
        ));

        auth.signup("A", "a@example.com", Utc::now()).unwrap();
        auth.update_profile(ProfileUpdate {
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            avatar: None,
        })
        .unwrap();
        auth.logout().unwrap();

        let user = auth.login("alice@example.com").unwrap();
        assert_eq!(user.name, "Alice");
        assert!(auth.login("a@example.com").is_err());
    }
}
