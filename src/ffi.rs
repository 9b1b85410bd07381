//! FFI bindings for Pulse Insights
//!
//! C-compatible entry points for calling the engine from mobile and other
//! host languages. Strings are null-terminated UTF-8; every returned string
//! is heap-allocated and must be released with `pulse_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::engine::insights_to_json;
use crate::error::InsightError;
use crate::report::WeeklyReport;
use crate::source::parse_records;

// Thread-local storage for the last error message
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

/// Convert to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Hand a result across the boundary, recording the error on failure
fn finish(result: Result<String, InsightError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn weekly_report_json(records_json: &str) -> Result<String, InsightError> {
    let records = parse_records(records_json)?;
    // A short history is not an error; the host gets JSON null
    let report = WeeklyReport::build_checked(&records)?;
    Ok(serde_json::to_string(&report)?)
}

/// Generate insights from a JSON array of records (newest first).
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated envelope JSON string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_generate_insights(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    finish(insights_to_json(json_str))
}

/// Build the weekly report from a JSON array of records (newest first).
///
/// The result is the report object, or `null` when fewer than seven records
/// are given.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_weekly_report(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    finish(weekly_report_json(&json_str))
}

/// Free a string returned by Pulse functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Pulse function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Pulse function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pulse_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pulse_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
