//! Assertion macros for workbench tests.
//!
//! - [`crate::assert_result_ok!`] - Assert a `Result` is `Ok` and extract the value
//! - [`crate::assert_result_err!`] - Assert a `Result` is `Err` and extract the error
//! - [`crate::assert_contains_error!`] - Assert the error's message contains a pattern
//! - [`crate::assert_modal!`] - Assert the workbench shows a modal containing a pattern
//!
//! # Example
//!
//! ```rust,ignore
//! use sourcelab::{assert_contains_error, assert_result_ok};
//!
//! let tokens = assert_result_ok!(lexical.submit("program p;").await);
//! assert_contains_error!(lexical.submit("   ").await, "enter some code");
//! ```

/// Assert that a Result is Ok and extract the value.
#[macro_export]
macro_rules! assert_result_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!(
                "Expected Ok, got Err: {:?}\n  at {}:{}:{}",
                e,
                file!(),
                line!(),
                column!()
            ),
        }
    };
    ($result:expr, $($msg:tt)+) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!(
                "{}: Expected Ok, got Err: {:?}\n  at {}:{}:{}",
                format!($($msg)+),
                e,
                file!(),
                line!(),
                column!()
            ),
        }
    };
}

/// Assert that a Result is Err and extract the error.
#[macro_export]
macro_rules! assert_result_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!(
                "Expected Err, got Ok: {:?}\n  at {}:{}:{}",
                value,
                file!(),
                line!(),
                column!()
            ),
            Err(e) => e,
        }
    };
}

/// Assert that an error's Display output contains a pattern.
#[macro_export]
macro_rules! assert_contains_error {
    ($result:expr, $pattern:expr) => {{
        let err = $crate::assert_result_err!($result);
        let err_str = err.to_string();
        assert!(
            err_str.contains($pattern),
            "Error '{}' does not contain '{}'\n  at {}:{}:{}",
            err_str,
            $pattern,
            file!(),
            line!(),
            column!()
        );
        err
    }};
}

/// Assert that a workbench currently shows an error modal whose message
/// contains a pattern, and return the message.
#[macro_export]
macro_rules! assert_modal {
    ($workbench:expr, $pattern:expr) => {{
        let message = match $workbench.notifications().modal() {
            Some(message) => message.to_string(),
            None => panic!(
                "Expected an error modal containing '{}', none shown\n  at {}:{}:{}",
                $pattern,
                file!(),
                line!(),
                column!()
            ),
        };
        assert!(
            message.contains($pattern),
            "Modal '{}' does not contain '{}'\n  at {}:{}:{}",
            message,
            $pattern,
            file!(),
            line!(),
            column!()
        );
        message
    }};
}
