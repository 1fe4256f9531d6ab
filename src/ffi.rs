//! FFI interface for host interop
//!
//! The host hands over the current page and a JSON request; the response
//! comes back as JSON. One scanner lives for the whole process so that
//! identity-keyed requests see the datasets of the last scan.

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::{LazyLock, Mutex};

use url::Url;

use crate::error::ScanError;
use crate::scanner::{Page, PageScanner};

static SCANNER: LazyLock<Mutex<PageScanner>> = LazyLock::new(|| Mutex::new(PageScanner::default()));

/// Result struct returned to the host
/// Both pointers are owned by Rust and must be freed via free_dispatch_result
#[repr(C)]
pub struct DispatchResultFFI {
    /// JSON-serialized response (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if the call itself failed (null-terminated), or null
    pub error_ptr: *mut c_char,
}

/// Answer one request against the process-wide scanner.
///
/// Request-level failures (unknown dataset, unknown action) are regular
/// `{"success": false}` responses; only a response that cannot be
/// serialized is an `Err`.
pub fn dispatch(html: &str, url: Option<&str>, request_json: &str) -> Result<String, ScanError> {
    let mut page = Page::new(html);
    if let Some(url) = url.and_then(|u| Url::parse(u).ok()) {
        page = page.with_url(url);
    }

    let mut scanner = SCANNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let response = scanner.handle_json(&page, request_json);
    Ok(serde_json::to_string(&response)?)
}

/// Dispatch a JSON request against the given page.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `url` - Page URL (null-terminated), or null
/// * `request_json` - JSON request (null-terminated)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `url` must be null or a valid null-terminated C string
/// - `request_json` must be a valid null-terminated C string
/// - Caller must free the result via `free_dispatch_result`
#[no_mangle]
pub unsafe extern "C" fn dataset_scraper_dispatch(
    html_ptr: *const c_char,
    html_len: usize,
    url: *const c_char,
    request_json: *const c_char,
) -> DispatchResultFFI {
    let html = if html_ptr.is_null() || html_len == 0 {
        ""
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in HTML content"),
        }
    };

    let url = if url.is_null() {
        None
    } else {
        match CStr::from_ptr(url).to_str() {
            Ok(s) => Some(s),
            Err(_) => return make_error_result("Invalid UTF-8 in URL"),
        }
    };

    if request_json.is_null() {
        return make_error_result("Request JSON is null");
    }
    let request = match CStr::from_ptr(request_json).to_str() {
        Ok(s) => s,
        Err(_) => return make_error_result("Invalid UTF-8 in request JSON"),
    };

    match dispatch(html, url, request) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => DispatchResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Response JSON contains null bytes"),
        },
        Err(e) => make_error_result(&e.to_string()),
    }
}

/// Free a DispatchResultFFI returned by dataset_scraper_dispatch
///
/// # Safety
/// - `result` must have been returned by `dataset_scraper_dispatch`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_dispatch_result(result: DispatchResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

fn make_error_result(msg: &str) -> DispatchResultFFI {
    let error_cstr = CString::new(msg).unwrap_or_else(|_| CString::from(c"Unknown error"));
    DispatchResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
