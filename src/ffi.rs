//! FFI bindings for Metabolic Flux
//!
//! This module provides C-compatible functions for calling the engine from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `metabolic_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::report::{analyze_json, estimate_json, MetabolicProcessor};

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

/// Run `f` on the request string and hand back its JSON, recording any error
unsafe fn json_call(
    json: *const c_char,
    f: impl FnOnce(&str) -> Result<String, ComputeError>,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match f(&json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a request JSON and return the encoded report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `metabolic_free_string`.
/// - Returns NULL on error; call `metabolic_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn metabolic_analyze_json(json: *const c_char) -> *mut c_char {
    json_call(json, analyze_json)
}

/// Estimate TDEE from a request JSON and return the estimate JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `metabolic_free_string`.
/// - Returns NULL on error; call `metabolic_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn metabolic_estimate_json(json: *const c_char) -> *mut c_char {
    json_call(json, estimate_json)
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a MetabolicProcessor
pub struct MetabolicProcessorHandle {
    processor: MetabolicProcessor,
}

/// Create a processor with an estimate cache.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration; otherwise it must be
///   a valid null-terminated C string.
/// - `cache_capacity <= 0` selects the default capacity.
/// - Must be freed with `metabolic_processor_free`.
/// - Returns NULL on error; call `metabolic_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn metabolic_processor_new(
    config_json: *const c_char,
    cache_capacity: i32,
) -> *mut MetabolicProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let parsed = cstr_to_string(config_json)
            .ok_or_else(|| "Invalid config string pointer".to_string())
            .and_then(|json| EngineConfig::from_json(&json).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(msg) => {
                set_last_error(&msg);
                return ptr::null_mut();
            }
        }
    };

    let capacity = if cache_capacity <= 0 {
        crate::cache::DEFAULT_CACHE_CAPACITY
    } else {
        cache_capacity as usize
    };

    match MetabolicProcessor::new(config, capacity) {
        Ok(processor) => Box::into_raw(Box::new(MetabolicProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `metabolic_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn metabolic_processor_free(processor: *mut MetabolicProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Analyze a request JSON with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `metabolic_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `metabolic_free_string`.
/// - Returns NULL on error; call `metabolic_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn metabolic_processor_analyze(
    processor: *mut MetabolicProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    if processor.is_null() {
        clear_last_error();
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;
    json_call(json, |request| handle.processor.analyze_json(request))
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next engine call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn metabolic_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn metabolic_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by engine functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an engine function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn metabolic_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
