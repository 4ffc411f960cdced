//! FFI bindings for Kesher core
//!
//! C-compatible entry points for the mobile shell. Strings crossing the
//! boundary are null-terminated UTF-8; every string returned by this module is
//! heap-allocated and must be released with `kesher_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::Utc;

use crate::store::{assess_risk_json, AppState};
use crate::types::parse_date;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Read a required string argument, recording an error naming it on failure
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {name} string pointer"));
    }
    value
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score check-in and sleep histories and return the risk assessment as JSON.
///
/// # Safety
/// - `check_ins_json` and `sleep_json` must be valid null-terminated C strings
///   holding JSON arrays; `today` must hold a `YYYY-MM-DD` date.
/// - Returns a newly allocated string that must be freed with `kesher_free_string`.
/// - Returns NULL on error; call `kesher_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kesher_assess_risk(
    check_ins_json: *const c_char,
    sleep_json: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(check_ins) = required_arg(check_ins_json, "check_ins_json") else {
        return ptr::null_mut();
    };
    let Some(sleep) = required_arg(sleep_json, "sleep_json") else {
        return ptr::null_mut();
    };
    let Some(today) = required_arg(today, "today") else {
        return ptr::null_mut();
    };

    match assess_risk_json(&check_ins, &sleep, &today) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful API
// ============================================================================

/// Opaque handle to the application state
pub struct KesherStateHandle {
    state: AppState,
}

/// Create an empty application state.
///
/// # Safety
/// - Returns a pointer that must be freed with `kesher_state_free`.
#[no_mangle]
pub unsafe extern "C" fn kesher_state_new() -> *mut KesherStateHandle {
    clear_last_error();
    Box::into_raw(Box::new(KesherStateHandle {
        state: AppState::new(),
    }))
}

/// Free an application state.
///
/// # Safety
/// - `handle` must be a pointer returned by `kesher_state_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn kesher_state_free(handle: *mut KesherStateHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Apply one JSON-encoded action, stamped with the current time.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kesher_state_new`.
/// - `action_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error (see `kesher_last_error`).
#[no_mangle]
pub unsafe extern "C" fn kesher_state_dispatch(
    handle: *mut KesherStateHandle,
    action_json: *const c_char,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return -1;
    }
    let handle = &mut *handle;

    let Some(action) = required_arg(action_json, "action_json") else {
        return -1;
    };

    match handle.state.dispatch_json(&action, Utc::now()) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Serialize the whole state to JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kesher_state_new`.
/// - Returns a newly allocated string that must be freed with `kesher_free_string`.
/// - Returns NULL on error; call `kesher_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn kesher_state_snapshot(handle: *const KesherStateHandle) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return ptr::null_mut();
    }
    let handle = &*handle;

    match handle.state.to_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Replace the state with a snapshot produced by `kesher_state_snapshot`.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kesher_state_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error. On error the state is unchanged.
#[no_mangle]
pub unsafe extern "C" fn kesher_state_load(
    handle: *mut KesherStateHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return -1;
    }
    let handle = &mut *handle;

    let Some(json) = required_arg(json, "json") else {
        return -1;
    };

    match AppState::from_json(&json) {
        Ok(state) => {
            handle.state = state;
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Dashboard summary as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `kesher_state_new`.
/// - `today` is a `YYYY-MM-DD` C string, or NULL for the current UTC date.
/// - Returns a newly allocated string that must be freed with `kesher_free_string`.
#[no_mangle]
pub unsafe extern "C" fn kesher_state_summary(
    handle: *const KesherStateHandle,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return ptr::null_mut();
    }
    let handle = &*handle;

    let today = if today.is_null() {
        Utc::now().date_naive()
    } else {
        let Some(raw) = required_arg(today, "today") else {
            return ptr::null_mut();
        };
        match parse_date(&raw) {
            Ok(date) => date,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match serde_json::to_string(&handle.state.summary(today)) {
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

/// Free a string returned by a `kesher_*` function.
///
/// # Safety
/// - `ptr` must be a pointer returned by this library, or NULL.
#[no_mangle]
pub unsafe extern "C" fn kesher_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Errors and version
// ============================================================================

/// Last error message on this thread, or NULL.
///
/// # Safety
/// - Valid until the next `kesher_*` call on this thread. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn kesher_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn kesher_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        kesher_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_assess_risk() {
        unsafe {
            let check_ins = CString::new(
                r#"[{"date":"2024-06-16","timestamp":"2024-06-16T08:00:00Z","mood":"good"}]"#,
            )
            .unwrap();
            let sleep = CString::new("[]").unwrap();
            let today = CString::new("2024-06-20").unwrap();

            let json = take_string(kesher_assess_risk(
                check_ins.as_ptr(),
                sleep.as_ptr(),
                today.as_ptr(),
            ));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["level"], "high");
            assert_eq!(value["days_since_last_check_in"], 4);
        }
    }

    #[test]
    fn test_ffi_state_lifecycle() {
        unsafe {
            let handle = kesher_state_new();
            assert!(!handle.is_null());

            let action = CString::new(
                r#"{"type":"notification","payload":{"type":"add","payload":{"kind":"check_in","title":"t","message":"m"}}}"#,
            )
            .unwrap();
            assert_eq!(kesher_state_dispatch(handle, action.as_ptr()), 0);

            let snapshot = kesher_state_snapshot(handle);
            assert!(!snapshot.is_null());

            let restored = kesher_state_new();
            assert_eq!(kesher_state_load(restored, snapshot), 0);
            kesher_free_string(snapshot);

            let summary = take_string(kesher_state_summary(restored, ptr::null()));
            let value: serde_json::Value = serde_json::from_str(&summary).unwrap();
            assert_eq!(value["unread_notifications"], 1);

            kesher_state_free(handle);
            kesher_state_free(restored);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let handle = kesher_state_new();
            let bad = CString::new("not json").unwrap();
            assert_eq!(kesher_state_dispatch(handle, bad.as_ptr()), -1);

            let error = kesher_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            assert_eq!(kesher_state_dispatch(ptr::null_mut(), bad.as_ptr()), -1);
            assert!(kesher_state_summary(ptr::null(), ptr::null()).is_null());
            kesher_state_free(handle);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = CStr::from_ptr(kesher_version()).to_str().unwrap();
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        }
    }
}
