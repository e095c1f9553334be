//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! instead of `String`, and pointer-plus-length pairs instead of `Vec`. Bodies
//! are byte buffers, never C strings, because multipart payloads may contain
//! NUL. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use formpost_core::{
    CancelToken, HttpRequest, HttpResponse, MultipartForm, UploadClient, UploadError,
};

/// Opaque handle to a `MultipartForm` being assembled by the C caller.
pub struct FfiForm {
    pub(crate) inner: MultipartForm,
}

/// Opaque handle to an `UploadClient`.
pub struct FfiUploadClient {
    pub(crate) inner: UploadClient,
}

/// Opaque handle to a `CancelToken`. Any thread may cancel it while another
/// is blocked in `formpost_post_cancellable`.
pub struct FfiCancelToken {
    pub(crate) inner: CancelToken,
}

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

/// Convert an owned string into a heap C string. Interior NULs yield "".
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak a `Vec` as a boxed slice. Empty vectors become null.
pub(crate) fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, usize) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len();
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a slice leaked by `into_raw_slice`.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: usize) -> Option<Box<[T]>> {
    if ptr.is_null() || len == 0 {
        return None;
    }
    Some(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) })
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

fn headers_into_raw(headers: Vec<(String, String)>) -> (*mut FfiHeader, u32) {
    let ffi_headers: Vec<FfiHeader> = headers
        .into_iter()
        .map(|(k, v)| FfiHeader {
            key: into_c_string(k),
            value: into_c_string(v),
        })
        .collect();
    let (ptr, len) = into_raw_slice(ffi_headers);
    (ptr, len as u32)
}

unsafe fn free_headers(headers: *mut FfiHeader, len: u32) {
    if let Some(headers) = unsafe { from_raw_slice(headers, len as usize) } {
        for h in headers.iter() {
            unsafe {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

/// A multipart POST described as C-compatible plain data.
///
/// Built by `formpost_build_request`. The C caller sends it as a `POST` to
/// `url` with `headers` and the `body_len` bytes at `body`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let (headers, headers_len) = headers_into_raw(req.headers);
        let (body, body_len) = into_raw_slice(req.body);
        Box::into_raw(Box::new(FfiHttpRequest {
            url: into_c_string(req.url),
            headers,
            headers_len,
            body,
            body_len,
        }))
    }

    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.url);
            free_headers(req.headers, req.headers_len);
        }
        drop(unsafe { from_raw_slice(req.body, req.body_len) });
    }
}

/// The raw response to an upload, owned by the library.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpResponse {
    fn from_core(resp: HttpResponse) -> *mut Self {
        let (headers, headers_len) = headers_into_raw(resp.headers);
        let (body, body_len) = into_raw_slice(resp.body);
        Box::into_raw(Box::new(FfiHttpResponse {
            status: resp.status,
            headers,
            headers_len,
            body,
            body_len,
        }))
    }

    unsafe fn free(resp: *mut Self) {
        let resp = unsafe { Box::from_raw(resp) };
        unsafe { free_headers(resp.headers, resp.headers_len) };
        drop(unsafe { from_raw_slice(resp.body, resp.body_len) });
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned by form mutators and in `FfiPostResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    Transport = 2,
    Cancelled = 3,
    TimedOut = 4,
    Framing = 5,
    Config = 6,
    Internal = 7,
    Panic = 8,
    NullArg = 9,
}

impl From<&UploadError> for FfiErrorCode {
    fn from(err: &UploadError) -> Self {
        match err {
            UploadError::InvalidUrl { .. } => FfiErrorCode::InvalidUrl,
            UploadError::Transport(_) => FfiErrorCode::Transport,
            UploadError::Cancelled => FfiErrorCode::Cancelled,
            UploadError::TimedOut(_) => FfiErrorCode::TimedOut,
            UploadError::Framing(_) => FfiErrorCode::Framing,
            UploadError::Config(_) => FfiErrorCode::Config,
            UploadError::WorkerLost | UploadError::Spawn(_) => FfiErrorCode::Internal,
        }
    }
}

/// Store `code` through an optional out-parameter.
///
/// # Safety
/// `out` must be null or valid for writes.
pub(crate) unsafe fn write_code(out: *mut FfiErrorCode, code: FfiErrorCode) {
    if !out.is_null() {
        unsafe { out.write(code) };
    }
}

/// Result envelope for `formpost_post` and `formpost_post_cancellable`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `response`
/// points to the raw response, whatever its status. On failure `response` is
/// null and `error_message` is a human-readable C string.
#[repr(C)]
pub struct FfiPostResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub response: *mut FfiHttpResponse,
}

impl FfiPostResult {
    pub(crate) fn ok(resp: HttpResponse) -> *mut Self {
        Box::into_raw(Box::new(FfiPostResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            response: FfiHttpResponse::from_core(resp),
        }))
    }

    pub(crate) fn from_error(err: UploadError) -> *mut Self {
        Self::failure(FfiErrorCode::from(&err), err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiPostResult {
            error_code,
            error_message: into_c_string(msg),
            response: std::ptr::null_mut(),
        }))
    }

    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if !result.response.is_null() {
            unsafe { FfiHttpResponse::free(result.response) };
        }
    }
}
