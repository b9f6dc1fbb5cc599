//! User records and the session pointer.
//!
//! Users live in the same store as tasks, one record per key, keyed by
//! username. `loggedInUser` names the current session; its absence means
//! nobody is logged in.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::{info, warn};

use crate::error::{AuthError, StoreError};
use crate::models::{ProfileUpdate, User};
use crate::storage::{Store, SESSION_KEY, TASKS_KEY};

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn validate_username(raw: &str) -> Result<String, AuthError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(AuthError::EmptyUsername);
    }
    if username == TASKS_KEY || username == SESSION_KEY {
        return Err(AuthError::ReservedUsername(username.to_string()));
    }
    Ok(username.to_string())
}

fn load_user(store: &Store, username: &str) -> Result<Option<User>, AuthError> {
    if username == TASKS_KEY || username == SESSION_KEY {
        return Ok(None);
    }
    Ok(store.get_json::<User>(username)?)
}

/// A record that no longer decodes does not hold the name.
fn is_taken(store: &Store, username: &str) -> Result<bool, AuthError> {
    Ok(load_user(store, username)?.is_some())
}

/// Checks the registration form's password confirmation.
pub fn check_confirmation(password: &str, confirm: &str) -> Result<(), AuthError> {
    if password != confirm {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(())
}

/// Creates a user record. Fails if the username is already taken.
#[tracing::instrument(skip(store, email, password))]
pub fn register(store: &Store, username: &str, email: &str, password: &str) -> Result<User, AuthError> {
    let username = validate_username(username)?;
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    if is_taken(store, &username)? {
        return Err(AuthError::UsernameTaken(username));
    }
    let user = User {
        username: username.clone(),
        email: email.trim().to_string(),
        password: hash_password(password)?,
    };
    store.set_json(&username, &user)?;
    info!("user registered");
    Ok(user)
}

/// Verifies credentials and records the session.
#[tracing::instrument(skip(store, password))]
pub fn login(store: &Store, username: &str, password: &str) -> Result<User, AuthError> {
    let username = username.trim();
    let user = load_user(store, username)?
        .ok_or_else(|| AuthError::UserNotFound(username.to_string()))?;
    if !verify_password(password, &user.password) {
        warn!("login rejected");
        return Err(AuthError::WrongPassword);
    }
    store.set_json(SESSION_KEY, &user.username)?;
    info!("logged in");
    Ok(user)
}

/// Clears the session. Logging out twice is harmless.
pub fn logout(store: &Store) -> Result<(), AuthError> {
    store.remove_item(SESSION_KEY)?;
    info!("logged out");
    Ok(())
}

/// The logged-in user, if the session points at a readable record.
pub fn current_user(store: &Store) -> Result<Option<User>, AuthError> {
    let Some(username) = store.get_json::<String>(SESSION_KEY)? else {
        return Ok(None);
    };
    let user = load_user(store, &username)?;
    if user.is_none() {
        warn!(%username, "session points at a missing user");
    }
    Ok(user)
}

/// Updates the logged-in user's profile.
///
/// A new username is checked for uniqueness, then the record moves to the
/// new key and the session follows it, all in a single write.
#[tracing::instrument(skip(store, update))]
pub fn update_profile(store: &Store, update: ProfileUpdate) -> Result<User, AuthError> {
    let mut user = current_user(store)?.ok_or(AuthError::NotLoggedIn)?;
    let old_username = user.username.clone();

    if let Some(email) = update.email {
        user.email = email.trim().to_string();
    }
    if let Some(password) = update.password {
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        user.password = hash_password(&password)?;
    }

    let renamed = match update.username {
        Some(raw) => {
            let new_username = validate_username(&raw)?;
            if new_username != old_username {
                if is_taken(store, &new_username)? {
                    return Err(AuthError::UsernameTaken(new_username));
                }
                user.username = new_username;
                true
            } else {
                false
            }
        }
        None => false,
    };

    let record = serde_json::to_string(&user).map_err(StoreError::from)?;
    let session = serde_json::to_string(&user.username).map_err(StoreError::from)?;
    store.update(|map| {
        map.insert(user.username.clone(), record);
        if renamed {
            map.remove(&old_username);
            map.insert(SESSION_KEY.to_string(), session);
        }
    })?;
    if renamed {
        info!(from = %old_username, to = %user.username, "username changed");
    }
    info!("profile updated");
    Ok(user)
}
