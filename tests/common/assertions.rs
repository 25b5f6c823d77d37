//! Custom assertion macros
//!
//! Assertions over session state and notifications with more descriptive
//! failure output than a bare `assert!`.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that the manager is signed in as `$email` and return the record
#[macro_export]
macro_rules! assert_signed_in {
    ($manager:expr, $email:expr) => {
        match $manager.state() {
            edusync::client::SessionState::Authenticated(record) => {
                assert_eq!(record.email, $email, "signed in as the wrong user");
                record
            }
            other => panic!("Expected an authenticated session, got {:?}", other),
        }
    };
}

/// Assert that the manager is anonymous and sends no Authorization header
#[macro_export]
macro_rules! assert_signed_out {
    ($manager:expr) => {
        assert_eq!(
            $manager.state(),
            edusync::client::SessionState::Anonymous,
            "expected an anonymous session"
        );
        assert!(
            $manager.api().authorization_header().is_none(),
            "anonymous session must not send an Authorization header"
        );
    };
}

/// Assert that the last notification has the given level and message
#[macro_export]
macro_rules! assert_notified {
    ($log:expr, $level:expr, $message:expr) => {
        match $log.last() {
            Some(notification) => {
                assert_eq!(notification.level, $level, "notification level");
                assert_eq!(notification.message, $message, "notification message");
            }
            None => panic!("Expected a notification, none was emitted"),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
