use core::ffi::c_int;
use serde_json::json;
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    ptr, slice,
};

pub mod utilities;
pub use utilities::{
    FitSummary, InitMethod, Kmeans, KmeansConfig, KmeansError, KmeansOptions, Point,
    RandomSource, Refinement, Stop, refine,
};

pub const OK: c_int = 0;
pub const ERR_INVALID_ARGS: c_int = 1;
pub const ERR_PANIC: c_int = 2;
pub const ERR_PARSE: c_int = 4;
pub const ERR_INVALID_CONFIG: c_int = 5;
pub const ERR_INVALID_INPUT: c_int = 6;
pub const ERR_INSUFFICIENT_DATA: c_int = 7;
pub const ERR_DIMENSION_MISMATCH: c_int = 8;
pub const ERR_NOT_FITTED: c_int = 9;
pub const ERR_NUMERIC: c_int = 10;

#[repr(C)]
pub struct Buf {
    pub ptr: *mut u8,
    pub len: usize,
}

#[cfg(all(target_arch = "wasm32", not(target_os = "wasi")))]
#[link(wasm_import_module = "env")]
unsafe extern "C" {
    fn js_log(ptr: *const u8, len: usize);
}

#[inline]
pub fn log_json<T: serde::Serialize>(v: &T) {
    if let Ok(s) = serde_json::to_string_pretty(v) {
        #[cfg(all(target_arch = "wasm32", not(target_os = "wasi")))]
        unsafe {
            js_log(s.as_ptr(), s.len());
        }

        #[cfg(not(all(target_arch = "wasm32", not(target_os = "wasi"))))]
        eprintln!("{s}");
    }
}

pub fn error_code(e: &KmeansError) -> c_int {
    match e {
        KmeansError::InvalidConfig { .. } => ERR_INVALID_CONFIG,
        KmeansError::InvalidInput(_) => ERR_INVALID_INPUT,
        KmeansError::InsufficientData { .. } => ERR_INSUFFICIENT_DATA,
        KmeansError::DimensionMismatch { .. } => ERR_DIMENSION_MISMATCH,
        KmeansError::NotFitted => ERR_NOT_FITTED,
        KmeansError::Numeric(_) => ERR_NUMERIC,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn alloc(size: usize) -> *mut u8 {
    if size == 0 {
        return core::ptr::null_mut();
    }
    let mut v = Vec::<u8>::with_capacity(size);
    let p = v.as_mut_ptr();
    core::mem::forget(v);
    p
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_(ptr_raw: *mut u8, size: usize) {
    if !ptr_raw.is_null() {
        let _ = unsafe { Vec::<u8>::from_raw_parts(ptr_raw, size, size) };
    }
}

/// Builds an engine from a JSON options object and hands back an owned
/// handle. Release it with `kmeans_free`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn kmeans_new(
    opts_ptr: *const u8,
    opts_len: usize,
    out_handle: *mut *mut Kmeans,
) -> c_int {
    if opts_ptr.is_null() || out_handle.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let bytes = unsafe { slice::from_raw_parts(opts_ptr, opts_len) };
        let km =
            Kmeans::from_json(bytes).map_err(|e| fail("kmeans_new", e, ptr::null_mut()))?;
        unsafe { ptr::write_unaligned(out_handle, Box::into_raw(Box::new(km))) };
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn kmeans_free(handle: *mut Kmeans) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle) });
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fit(
    handle: *mut Kmeans,
    data_ptr: *const f64,
    n_rows: usize,
    dim: usize,
    out_json: *mut Buf,
) -> c_int {
    if handle.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let km = unsafe { &mut *handle };
        let points = unsafe { rows_from_raw("fit", data_ptr, n_rows, dim, out_json) }?;
        let summary = km.fit(&points).map_err(|e| fail("fit", e, out_json))?;
        write_json(out_json, &summary)
    })
}

/// Same as `fit`, taking `number[][]` as JSON so jagged rows can be seen.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fit_json(
    handle: *mut Kmeans,
    json_ptr: *const u8,
    json_len: usize,
    out_json: *mut Buf,
) -> c_int {
    if handle.is_null() || json_ptr.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let km = unsafe { &mut *handle };
        let bytes = unsafe { slice::from_raw_parts(json_ptr, json_len) };
        let points = rows_from_json(bytes).map_err(|e| fail("fit_json", e, out_json))?;
        let summary = km.fit(&points).map_err(|e| fail("fit_json", e, out_json))?;
        write_json(out_json, &summary)
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn predict(
    handle: *const Kmeans,
    data_ptr: *const f64,
    n_rows: usize,
    dim: usize,
    out_json: *mut Buf,
) -> c_int {
    if handle.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let km = unsafe { &*handle };
        let points = unsafe { rows_from_raw("predict", data_ptr, n_rows, dim, out_json) }?;
        let labels = km.predict(&points).map_err(|e| fail("predict", e, out_json))?;
        write_json(out_json, &labels)
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fit_predict(
    handle: *mut Kmeans,
    data_ptr: *const f64,
    n_rows: usize,
    dim: usize,
    out_json: *mut Buf,
) -> c_int {
    if handle.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let km = unsafe { &mut *handle };
        let points = unsafe { rows_from_raw("fit_predict", data_ptr, n_rows, dim, out_json) }?;
        let labels = km
            .fit_predict(&points)
            .map_err(|e| fail("fit_predict", e, out_json))?;
        write_json(out_json, &labels)
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn centroids_(handle: *const Kmeans, out_json: *mut Buf) -> c_int {
    if handle.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let km = unsafe { &*handle };
        let centroids = km.centroids().map_err(|e| fail("centroids_", e, out_json))?;
        write_json(out_json, &centroids)
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn cluster_(handle: *const Kmeans, out_json: *mut Buf) -> c_int {
    if handle.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let km = unsafe { &*handle };
        let labels = km.labels().map_err(|e| fail("cluster_", e, out_json))?;
        write_json(out_json, &labels)
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn clusters_(handle: *const Kmeans, out_json: *mut Buf) -> c_int {
    if handle.is_null() || out_json.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let km = unsafe { &*handle };
        let groups = km.clusters().map_err(|e| fail("clusters_", e, out_json))?;
        write_json(out_json, &groups)
    })
}

/// Smoke test for host bindings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn greet(name_ptr: *const u8, name_len: usize, out: *mut Buf) -> c_int {
    if name_ptr.is_null() || out.is_null() {
        return ERR_INVALID_ARGS;
    }
    guard(|| {
        let name = std::str::from_utf8(unsafe { slice::from_raw_parts(name_ptr, name_len) })
            .map_err(|_| ERR_PARSE)?;
        let s = format!("Hello, {name}!");
        write_buf(out, s.into_bytes().into_boxed_slice());
        Ok(())
    })
}

fn guard(run: impl FnOnce() -> Result<(), c_int>) -> c_int {
    match catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(())) => OK,
        Ok(Err(code)) => code,
        Err(_) => ERR_PANIC,
    }
}

// Error JSON goes to `out` when one was supplied.
fn fail(call: &'static str, e: KmeansError, out: *mut Buf) -> c_int {
    let body = json!({ "error": e.kind(), "message": e.to_string() });
    log_json(&json!({ "call": call, "kind": e.kind(), "message": e.to_string() }));
    if !out.is_null() {
        if let Ok(bytes) = serde_json::to_vec(&body) {
            write_buf(out, bytes.into_boxed_slice());
        }
    }
    error_code(&e)
}

unsafe fn rows_from_raw(
    call: &'static str,
    data_ptr: *const f64,
    n_rows: usize,
    dim: usize,
    out: *mut Buf,
) -> Result<Vec<Point>, c_int> {
    if n_rows == 0 {
        return Ok(Vec::new());
    }
    if dim == 0 {
        let e = KmeansError::InvalidInput("points must have at least one coordinate".into());
        return Err(fail(call, e, out));
    }
    let len = n_rows
        .checked_mul(dim)
        .filter(|&len| len <= isize::MAX as usize / size_of::<f64>())
        .ok_or_else(|| {
            let e = KmeansError::InvalidInput(format!(
                "{n_rows} rows of {dim} values exceed the addressable size"
            ));
            fail(call, e, out)
        })?;
    if data_ptr.is_null() {
        return Err(ERR_INVALID_ARGS);
    }
    let flat = unsafe { slice::from_raw_parts(data_ptr, len) };
    Ok(flat.chunks_exact(dim).map(<[f64]>::to_vec).collect())
}

fn rows_from_json(bytes: &[u8]) -> Result<Vec<Point>, KmeansError> {
    serde_json::from_slice(bytes)
        .map_err(|e| KmeansError::InvalidInput(format!("expected number[][]: {e}")))
}

fn write_json<T: serde::Serialize + ?Sized>(out: *mut Buf, v: &T) -> Result<(), c_int> {
    let bytes = serde_json::to_vec(v).map_err(|_| ERR_PARSE)?;
    write_buf(out, bytes.into_boxed_slice());
    Ok(())
}

fn write_buf(out: *mut Buf, bytes: Box<[u8]>) {
    let len = bytes.len();
    let ptr_bytes = Box::into_raw(bytes) as *mut u8;
    unsafe {
        ptr::write_unaligned(
            out,
            Buf {
                ptr: ptr_bytes,
                len,
            },
        )
    };
}
