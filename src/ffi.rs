//! FFI bindings for UX HeatGrid
//!
//! This module provides C-compatible functions for driving a session from a
//! host runtime. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `heatgrid_free_string`. Timestamps are Unix epoch milliseconds.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, TimeZone, Utc};

use crate::command::{Command, HostEvent};
use crate::config::HeatGridConfig;
use crate::host::StaticPage;
use crate::recording::SessionDriver;
use crate::report::ReportEncoder;
use crate::ux::evaluate_page;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn timestamp(now_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(now_ms).single()
}

// ============================================================================
// Stateless API
// ============================================================================

/// Evaluate a static page snapshot and return the UX evaluation as JSON.
///
/// # Safety
/// - `page_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `heatgrid_free_string`.
/// - Returns NULL on error; call `heatgrid_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_evaluate(page_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let page_str = match cstr_to_string(page_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid page string pointer");
            return ptr::null_mut();
        }
    };

    let result = StaticPage::from_json(&page_str)
        .and_then(|page| evaluate_page(&page, &HeatGridConfig::default()))
        .and_then(|evaluation| Ok(serde_json::to_string(&evaluation)?));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Session API
// ============================================================================

/// Opaque handle to a session bound to a page snapshot
pub struct HeatGridSessionHandle {
    driver: SessionDriver,
    encoder: ReportEncoder,
}

/// Create a session over a page snapshot.
///
/// # Safety
/// - `page_json` must be a valid null-terminated C string.
/// - `config_json` may be NULL to use the default configuration.
/// - Returns a pointer that must be freed with `heatgrid_session_free`.
/// - Returns NULL on error; call `heatgrid_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_session_new(
    page_json: *const c_char,
    config_json: *const c_char,
) -> *mut HeatGridSessionHandle {
    clear_last_error();

    let page_str = match cstr_to_string(page_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid page string pointer");
            return ptr::null_mut();
        }
    };

    let config = if config_json.is_null() {
        HeatGridConfig::default()
    } else {
        let config_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match HeatGridConfig::from_json(&config_str) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let driver = StaticPage::from_json(&page_str).and_then(|page| SessionDriver::new(config, page));
    match driver {
        Ok(driver) => Box::into_raw(Box::new(HeatGridSessionHandle {
            driver,
            encoder: ReportEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a session.
///
/// # Safety
/// - `session` must be a valid pointer returned by `heatgrid_session_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_session_free(session: *mut HeatGridSessionHandle) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Send a command and return the JSON response.
///
/// A command that fails inside the session still yields a response
/// (`{"success":false,"error":...}`); NULL is returned only for unusable input.
///
/// # Safety
/// - `session` must be a valid pointer returned by `heatgrid_session_new`.
/// - `command_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `heatgrid_free_string`.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_session_command(
    session: *mut HeatGridSessionHandle,
    command_json: *const c_char,
    now_ms: i64,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }

    let handle = &mut *session;

    let command_str = match cstr_to_string(command_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid command string pointer");
            return ptr::null_mut();
        }
    };

    let now = match timestamp(now_ms) {
        Some(now) => now,
        None => {
            set_last_error("Timestamp out of range");
            return ptr::null_mut();
        }
    };

    let result = Command::from_json(&command_str)
        .and_then(|command| handle.driver.command(command, now).to_json());

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Deliver a host event (pointer move, click, scroll, resize, mutation,
/// frame or advance).
///
/// # Safety
/// - `session` must be a valid pointer returned by `heatgrid_session_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `heatgrid_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_session_event(
    session: *mut HeatGridSessionHandle,
    event_json: *const c_char,
    now_ms: i64,
) -> i32 {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return -1;
    }

    let handle = &mut *session;

    let event_str = match cstr_to_string(event_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid event string pointer");
            return -1;
        }
    };

    let now = match timestamp(now_ms) {
        Some(now) => now,
        None => {
            set_last_error("Timestamp out of range");
            return -1;
        }
    };

    match HostEvent::from_json(&event_str).and_then(|event| handle.driver.event(event, now)) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Export a session report as JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `heatgrid_session_new`.
/// - Returns a newly allocated string that must be freed with `heatgrid_free_string`.
/// - Returns NULL on error; call `heatgrid_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_session_report(
    session: *mut HeatGridSessionHandle,
    now_ms: i64,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }

    let handle = &mut *session;

    let now = match timestamp(now_ms) {
        Some(now) => now,
        None => {
            set_last_error("Timestamp out of range");
            return ptr::null_mut();
        }
    };

    handle.driver.advance(now);
    let driver = &mut handle.driver;
    let result = driver
        .session
        .analytics(&driver.page)
        .and_then(|analytics| handle.encoder.encode_to_json(&driver.session, analytics, now));

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by HeatGrid functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a HeatGrid function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next HeatGrid function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the HeatGrid library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn heatgrid_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    const T0_MS: i64 = 1_772_460_000_000;

    fn sample_page_json() -> CString {
        CString::new(
            r#"{
            "metrics": {
                "documentWidth": 1200, "documentHeight": 2400,
                "viewportWidth": 1200, "viewportHeight": 800
            },
            "elements": [
                {"node": 1, "tag": "h1", "rect": {"top": 40, "left": 60, "width": 700, "height": 50},
                 "text": "Pricing plans"},
                {"node": 2, "tag": "button", "rect": {"top": 140, "left": 60, "width": 180, "height": 44},
                 "text": "Start free trial"},
                {"node": 3, "tag": "p", "rect": {"top": 220, "left": 60, "width": 700, "height": 96},
                 "text": "Every plan includes unlimited projects."}
            ]
        }"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        heatgrid_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_evaluate() {
        let page = sample_page_json();
        unsafe {
            let result = take_string(heatgrid_evaluate(page.as_ptr()));
            assert!(result.contains("\"score\""));
            assert!(result.contains("\"whiteSpaceRatio\""));
        }
    }

    #[test]
    fn test_ffi_session_lifecycle() {
        let page = sample_page_json();
        let start = CString::new(r#"{"action":"startTracking"}"#).unwrap();
        let status = CString::new(r#"{"action":"getStatus"}"#).unwrap();
        let click = CString::new(r#"{"type":"click","x":100,"y":160}"#).unwrap();

        unsafe {
            let session = heatgrid_session_new(page.as_ptr(), ptr::null());
            assert!(!session.is_null());

            let ack = take_string(heatgrid_session_command(session, start.as_ptr(), T0_MS));
            assert_eq!(ack, r#"{"success":true,"isPaused":false}"#);

            assert_eq!(heatgrid_session_event(session, click.as_ptr(), T0_MS + 100), 0);

            let status = take_string(heatgrid_session_command(session, status.as_ptr(), T0_MS + 200));
            assert!(status.contains("\"isTracking\":true"));

            let report = take_string(heatgrid_session_report(session, T0_MS + 600));
            assert!(report.contains("\"producer\""));
            assert!(report.contains("\"heatCells\": 1"));

            heatgrid_session_free(session);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let page = sample_page_json();
        let bogus = CString::new(r#"{"action":"explode"}"#).unwrap();

        unsafe {
            let session = heatgrid_session_new(page.as_ptr(), ptr::null());
            let result = heatgrid_session_command(session, bogus.as_ptr(), T0_MS);
            assert!(result.is_null());

            let error = heatgrid_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.starts_with("Invalid command"));

            let invalid = CString::new("not json").unwrap();
            assert!(heatgrid_session_new(invalid.as_ptr(), ptr::null()).is_null());
            assert!(heatgrid_session_command(ptr::null_mut(), bogus.as_ptr(), T0_MS).is_null());

            heatgrid_session_free(session);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = heatgrid_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
