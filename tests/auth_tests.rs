mod common;

use studyplan::auth::{check_confirmation, current_user, login, logout, register, update_profile};
use studyplan::models::{ProfileUpdate, User};
use studyplan::storage::SESSION_KEY;
use studyplan::AuthError;

use common::with_test_store;

#[test]
fn test_register_stores_hashed_record() {
    with_test_store(|store| {
        register(&store, "alice", "alice@example.com", "secret").unwrap();

        let user: User = store.get_json("alice").unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_ne!(user.password, "secret");
        assert!(user.password.starts_with("$argon2"));
    });
}

#[test]
fn test_duplicate_username_rejected() {
    with_test_store(|store| {
        register(&store, "alice", "a@example.com", "secret").unwrap();
        let err = register(&store, "alice", "other@example.com", "other").unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken(name) if name == "alice"));

        let keys = store.keys().unwrap();
        assert_eq!(keys.iter().filter(|k| *k == "alice").count(), 1);
        let user: User = store.get_json("alice").unwrap().unwrap();
        assert_eq!(user.email, "a@example.com");
    });
}

#[test]
fn test_register_validation() {
    with_test_store(|store| {
        assert!(matches!(register(&store, "  ", "", "pw"), Err(AuthError::EmptyUsername)));
        assert!(matches!(register(&store, "bob", "", ""), Err(AuthError::EmptyPassword)));
        assert!(matches!(register(&store, "TASKS", "", "pw"), Err(AuthError::ReservedUsername(_))));
        assert!(matches!(register(&store, "loggedInUser", "", "pw"), Err(AuthError::ReservedUsername(_))));
        assert!(store.keys().unwrap().is_empty());
    });
}

#[test]
fn test_password_confirmation() {
    assert!(check_confirmation("abc", "abc").is_ok());
    assert!(matches!(check_confirmation("abc", "abd"), Err(AuthError::PasswordMismatch)));
}

#[test]
fn test_wrong_password_leaves_session_unset() {
    with_test_store(|store| {
        register(&store, "alice", "", "secret").unwrap();
        let err = login(&store, "alice", "nope").unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
        assert!(store.get_item(SESSION_KEY).unwrap().is_none());
        assert!(current_user(&store).unwrap().is_none());
    });
}

#[test]
fn test_unknown_user() {
    with_test_store(|store| {
        let err = login(&store, "ghost", "x").unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound(name) if name == "ghost"));
        // reserved keys are never users
        assert!(matches!(login(&store, "TASKS", "x"), Err(AuthError::UserNotFound(_))));
    });
}

#[test]
fn test_login_and_logout() {
    with_test_store(|store| {
        register(&store, "alice", "", "secret").unwrap();
        login(&store, "alice", "secret").unwrap();
        assert_eq!(current_user(&store).unwrap().unwrap().username, "alice");
        assert_eq!(store.get_json::<String>(SESSION_KEY).unwrap().as_deref(), Some("alice"));

        logout(&store).unwrap();
        assert!(current_user(&store).unwrap().is_none());
        logout(&store).unwrap();
    });
}

#[test]
fn test_dangling_session_is_logged_out() {
    with_test_store(|store| {
        store.set_json(SESSION_KEY, "nobody").unwrap();
        assert!(current_user(&store).unwrap().is_none());
    });
}

#[test]
fn test_update_profile_requires_session() {
    with_test_store(|store| {
        let err = update_profile(&store, ProfileUpdate { email: Some("x".into()), ..Default::default() }).unwrap_err();
        assert!(matches!(err, AuthError::NotLoggedIn));
    });
}

#[test]
fn test_rename_rekeys_record_and_session() {
    with_test_store(|store| {
        register(&store, "alice", "a@example.com", "secret").unwrap();
        register(&store, "bob", "", "pw").unwrap();
        login(&store, "alice", "secret").unwrap();

        let err = update_profile(&store, ProfileUpdate { username: Some("bob".into()), ..Default::default() }).unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken(_)));
        assert_eq!(current_user(&store).unwrap().unwrap().username, "alice");

        for reserved in ["TASKS", "loggedInUser"] {
            let err = update_profile(&store, ProfileUpdate { username: Some(reserved.into()), ..Default::default() }).unwrap_err();
            assert!(matches!(err, AuthError::ReservedUsername(_)));
        }
        let err = update_profile(&store, ProfileUpdate {
            username: Some("   ".into()),
            email: Some("lost@example.com".into()),
            ..Default::default()
        }).unwrap_err();
        assert!(matches!(err, AuthError::EmptyUsername));
        let unchanged = current_user(&store).unwrap().unwrap();
        assert_eq!(unchanged.username, "alice");
        assert_eq!(unchanged.email, "a@example.com");
        assert!(store.get_item("TASKS").unwrap().is_none());

        let user = update_profile(&store, ProfileUpdate {
            username: Some("alicia".into()),
            email: Some("alicia@example.com".into()),
            ..Default::default()
        }).unwrap();
        assert_eq!(user.username, "alicia");

        assert!(store.get_item("alice").unwrap().is_none());
        let current = current_user(&store).unwrap().unwrap();
        assert_eq!(current.username, "alicia");
        assert_eq!(current.email, "alicia@example.com");

        logout(&store).unwrap();
        login(&store, "alicia", "secret").unwrap();
        assert!(matches!(login(&store, "alice", "secret"), Err(AuthError::UserNotFound(_))));
    });
}

#[test]
fn test_change_password() {
    with_test_store(|store| {
        register(&store, "alice", "", "old").unwrap();
        login(&store, "alice", "old").unwrap();
        update_profile(&store, ProfileUpdate { password: Some("new".into()), ..Default::default() }).unwrap();

        assert!(matches!(login(&store, "alice", "old"), Err(AuthError::WrongPassword)));
        login(&store, "alice", "new").unwrap();
    });
}

#[test]
fn test_unreadable_record_does_not_hold_the_name() {
    with_test_store(|store| {
        store.set_item("bob", "{broken").unwrap();
        assert!(matches!(login(&store, "bob", "pw"), Err(AuthError::UserNotFound(_))));

        register(&store, "bob", "", "pw").unwrap();
        assert_eq!(login(&store, "bob", "pw").unwrap().username, "bob");
    });
}
