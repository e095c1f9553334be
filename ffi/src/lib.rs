//! C-ABI wrapper around `formpost-core`.
//!
//! # Overview
//! Lets any language with a C FFI assemble a multipart form and either get
//! back the encoded POST as plain data (the host does the I/O) or have the
//! library send it with its blocking transport.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Forms, clients and cancel tokens are opaque handles created by `*_new`
//!   and released by the matching `*_free`.
//! - Functions that return a handle or request pointer report why they failed
//!   through an optional `FfiErrorCode` out-parameter.
//! - Request and response bodies are pointer-plus-length byte buffers, so
//!   binary payloads survive intact.
//! - The C caller owns all returned pointers and must call the matching
//!   `formpost_free_*` function to release them.

pub mod types;

use std::borrow::Cow;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use formpost_core::{
    CancelToken, ClientConfig, FileField, FormField, HttpResponse, MultipartForm, UploadClient,
    UploadError,
};

use types::*;

/// Read a caller-provided C string, replacing invalid UTF-8.
///
/// # Safety
/// `s` must be non-null and NUL-terminated.
unsafe fn read_str<'a>(s: *const c_char) -> Cow<'a, str> {
    unsafe { CStr::from_ptr(s) }.to_string_lossy()
}

/// `None` when `s` is null.
unsafe fn read_opt_string(s: *const c_char) -> Option<String> {
    if s.is_null() {
        None
    } else {
        Some(unsafe { read_str(s) }.into_owned())
    }
}

// ---------------------------------------------------------------------------
// Form lifecycle
// ---------------------------------------------------------------------------

/// Create an empty form. Free it with `formpost_form_free`.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_form_new() -> *mut FfiForm {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiForm {
            inner: MultipartForm::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a form created by `formpost_form_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_form_free(form: *mut FfiForm) {
    if !form.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(form) });
        });
    }
}

/// Add or replace a text field. A replaced field keeps its position.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_form_add_text(
    form: *mut FfiForm,
    name: *const c_char,
    value: *const c_char,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        if form.is_null() || name.is_null() || value.is_null() {
            return FfiErrorCode::NullArg;
        }
        let form = unsafe { &mut *form };
        let name = unsafe { read_str(name) }.into_owned();
        let value = unsafe { read_str(value) }.into_owned();
        form.inner.insert(name, FormField::Text { value });
        FfiErrorCode::Ok
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

/// Add or replace a file field holding a copy of `data_len` bytes at `data`.
///
/// `data` may be null only when `data_len` is 0. `filename` and
/// `content_type` may be null to use the defaults (the field name and
/// `application/octet-stream`).
#[unsafe(no_mangle)]
pub extern "C" fn formpost_form_add_file(
    form: *mut FfiForm,
    name: *const c_char,
    data: *const u8,
    data_len: usize,
    filename: *const c_char,
    content_type: *const c_char,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        if form.is_null() || name.is_null() || (data.is_null() && data_len > 0) {
            return FfiErrorCode::NullArg;
        }
        let form = unsafe { &mut *form };
        let name = unsafe { read_str(name) }.into_owned();
        let bytes = if data_len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(data, data_len) }.to_vec()
        };
        let file = FileField {
            data: bytes,
            filename: unsafe { read_opt_string(filename) },
            content_type: unsafe { read_opt_string(content_type) },
        };
        form.inner.insert(name, FormField::File(file));
        FfiErrorCode::Ok
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

/// Number of fields in the form. Returns 0 for null.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_form_len(form: *const FfiForm) -> u32 {
    if form.is_null() {
        return 0;
    }
    catch_unwind(|| unsafe { &*form }.inner.len() as u32).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create an upload client sending `user_agent`.
///
/// `timeout_ms` bounds each post end to end; 0 disables the timeout.
/// Returns null if `user_agent` is null. Free with `formpost_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_client_new(
    user_agent: *const c_char,
    timeout_ms: u64,
) -> *mut FfiUploadClient {
    catch_unwind(|| {
        if user_agent.is_null() {
            return std::ptr::null_mut();
        }
        let user_agent = unsafe { read_str(user_agent) };
        let config = ClientConfig {
            timeout_ms,
            ..ClientConfig::default()
        };
        let client = UploadClient::with_config(&user_agent, config);
        Box::into_raw(Box::new(FfiUploadClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create an upload client from a JSON `ClientConfig` document.
///
/// Without a `user_agent` in the document the client sends
/// `formpost-ffi/<version>`. Returns null on a null or invalid document and
/// stores the reason in `error_out` when it is non-null. Free with
/// `formpost_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_client_from_json(
    config_json: *const c_char,
    error_out: *mut FfiErrorCode,
) -> *mut FfiUploadClient {
    catch_unwind(AssertUnwindSafe(|| {
        if config_json.is_null() {
            unsafe { write_code(error_out, FfiErrorCode::NullArg) };
            return std::ptr::null_mut();
        }
        let raw = unsafe { read_str(config_json) };
        match ClientConfig::from_json(&raw) {
            Ok(config) => {
                let client = UploadClient::from_config(config, &formpost_core::program_info!());
                unsafe { write_code(error_out, FfiErrorCode::Ok) };
                Box::into_raw(Box::new(FfiUploadClient { inner: client }))
            }
            Err(e) => {
                unsafe { write_code(error_out, FfiErrorCode::from(&e)) };
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or_else(|_| {
        unsafe { write_code(error_out, FfiErrorCode::Panic) };
        std::ptr::null_mut()
    })
}

/// Free a client created by `formpost_client_new` or
/// `formpost_client_from_json`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_client_free(client: *mut FfiUploadClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Build and send
// ---------------------------------------------------------------------------

/// Encode `form` as a multipart POST to `url` without sending it.
///
/// Returns null if any argument is null, `url` is not an http(s) URL, or a
/// strict-framing client rejects the form. When `error_out` is non-null it
/// receives `Ok` or the failure code (`NullArg`, `InvalidUrl`, `Framing`).
/// The caller must free the returned pointer with `formpost_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_build_request(
    client: *const FfiUploadClient,
    url: *const c_char,
    form: *const FfiForm,
    error_out: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || url.is_null() || form.is_null() {
            unsafe { write_code(error_out, FfiErrorCode::NullArg) };
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let form = unsafe { &*form };
        let url = unsafe { read_str(url) };
        match client.inner.build_post(&url, &form.inner) {
            Ok(req) => {
                unsafe { write_code(error_out, FfiErrorCode::Ok) };
                FfiHttpRequest::from_core(req)
            }
            Err(e) => {
                unsafe { write_code(error_out, FfiErrorCode::from(&e)) };
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or_else(|_| {
        unsafe { write_code(error_out, FfiErrorCode::Panic) };
        std::ptr::null_mut()
    })
}

/// Encode `form` and POST it to `url`, blocking until the response arrives,
/// the connection fails, or the client's timeout elapses.
///
/// Always returns a result; free it with `formpost_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_post(
    client: *const FfiUploadClient,
    url: *const c_char,
    form: *const FfiForm,
) -> *mut FfiPostResult {
    catch_unwind(AssertUnwindSafe(|| unsafe {
        post_with(client, url, form, |client, url, form| client.post(url, form))
    }))
    .unwrap_or_else(|_| FfiPostResult::panic("panic in formpost_post"))
}

/// Like `formpost_post`, but returns early with `Cancelled` once `token` is
/// cancelled, or with `TimedOut` when the client's timeout elapses.
///
/// Always returns a result; free it with `formpost_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_post_cancellable(
    client: *const FfiUploadClient,
    url: *const c_char,
    form: *const FfiForm,
    token: *const FfiCancelToken,
) -> *mut FfiPostResult {
    catch_unwind(AssertUnwindSafe(|| {
        if token.is_null() {
            return FfiPostResult::null_arg("token");
        }
        let token = unsafe { &*token };
        unsafe {
            post_with(client, url, form, |client, url, form| {
                client.post_cancellable(url, form, &token.inner)
            })
        }
    }))
    .unwrap_or_else(|_| FfiPostResult::panic("panic in formpost_post_cancellable"))
}

/// Null-check the shared arguments of the post functions and run `send`.
///
/// # Safety
/// Non-null pointers must be live handles and a NUL-terminated string.
unsafe fn post_with(
    client: *const FfiUploadClient,
    url: *const c_char,
    form: *const FfiForm,
    send: impl FnOnce(&UploadClient, &str, &MultipartForm) -> Result<HttpResponse, UploadError>,
) -> *mut FfiPostResult {
    if client.is_null() {
        return FfiPostResult::null_arg("client");
    }
    if url.is_null() {
        return FfiPostResult::null_arg("url");
    }
    if form.is_null() {
        return FfiPostResult::null_arg("form");
    }
    let client = unsafe { &*client };
    let form = unsafe { &*form };
    let url = unsafe { read_str(url) };
    match send(&client.inner, &*url, &form.inner) {
        Ok(resp) => FfiPostResult::ok(resp),
        Err(e) => FfiPostResult::from_error(e),
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Create a cancel token. Free with `formpost_cancel_token_free`.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_cancel_token_new() -> *mut FfiCancelToken {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiCancelToken {
            inner: CancelToken::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Cancel every post waiting on `token`, now and later. Null is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_cancel_token_cancel(token: *const FfiCancelToken) {
    if !token.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &*token }.inner.cancel()));
    }
}

/// Free a token. No post may still be using it. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_cancel_token_free(token: *mut FfiCancelToken) {
    if !token.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(token) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `formpost_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free an `FfiPostResult` returned by `formpost_post` or
/// `formpost_post_cancellable`, including its response. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn formpost_free_result(result: *mut FfiPostResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiPostResult::free(result) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
