#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::ptr;
    use std::slice;

    use libc::c_char;
    use zreg::*;

    fn service(config: &str) -> *mut ZregService {
        let mut out: *mut ZregService = ptr::null_mut();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_service_new(config.as_ptr(), config.len(), None, &mut out, &mut error);
        assert_eq!(status, ZregStatus::Ok, "service_new failed");
        assert!(error.is_null());
        assert!(!out.is_null());
        assert_eq!(zreg_service_start(out), ZregStatus::Ok);
        out
    }

    /// Take ownership of the error slot's message.
    fn take_error(error: *mut c_char) -> String {
        assert!(!error.is_null(), "error slot must be populated on failure");
        let text = unsafe { CStr::from_ptr(error) }.to_str().unwrap().to_owned();
        zreg_string_free(error);
        text
    }

    /// Copy a result buffer out and free it.
    fn take_buffer(buffer: ZregBuffer) -> Vec<u8> {
        assert!(!buffer.data.is_null(), "result buffer must be non-null on success");
        let bytes = unsafe { slice::from_raw_parts(buffer.data, buffer.len) }.to_vec();
        zreg_buffer_free(buffer);
        bytes
    }

    fn create(svc: *const ZregService, name: &str, level: i32, window: i32) -> ZregStatus {
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_create(svc, name.as_ptr(), name.len(), level, window, &mut error);
        if status != ZregStatus::Ok {
            take_error(error);
        } else {
            assert!(error.is_null());
        }
        status
    }

    fn compress(svc: *const ZregService, name: &str, data: &[u8]) -> Result<Vec<u8>, (ZregStatus, String)> {
        let mut out = ZregBuffer::empty();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_compress(svc, name.as_ptr(), name.len(), data.as_ptr(), data.len(), &mut out, &mut error);
        one_slot(status, out, error)
    }

    fn decompress(svc: *const ZregService, name: &str, data: &[u8]) -> Result<Vec<u8>, (ZregStatus, String)> {
        let mut out = ZregBuffer::empty();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_decompress(svc, name.as_ptr(), name.len(), data.as_ptr(), data.len(), &mut out, &mut error);
        one_slot(status, out, error)
    }

    /// Exactly one of result / error is populated.
    fn one_slot(status: ZregStatus, out: ZregBuffer, error: *mut c_char) -> Result<Vec<u8>, (ZregStatus, String)> {
        if status == ZregStatus::Ok {
            assert!(error.is_null(), "error slot set on success");
            Ok(take_buffer(out))
        } else {
            assert!(out.data.is_null(), "result set on failure");
            Err((status, take_error(error)))
        }
    }

    #[test]
    fn named_roundtrip_and_stats() {
        let svc = service("");
        assert_eq!(create(svc, "docs", 6, 22), ZregStatus::Ok);

        let data = b"boundary round trip with a repeating body. ".repeat(100);
        let compressed = compress(svc, "docs", &data).unwrap();
        assert_eq!(decompress(svc, "docs", &compressed).unwrap(), data);

        let mut stats = ZregStats::default();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_get_stats(svc, "docs".as_ptr(), 4, &mut stats, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        assert_eq!(stats.original_size, data.len() as u64);
        assert_eq!(stats.compressed_size, compressed.len() as u64);
        assert_eq!(stats.compression_ratio, data.len() as f64 / compressed.len() as f64);

        zreg_service_free(svc);
    }

    #[test]
    fn empty_input_gives_non_null_empty_result() {
        let svc = service("{}");
        assert_eq!(create(svc, "e", 3, 22), ZregStatus::Ok);

        let mut out = ZregBuffer::empty();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_compress(svc, "e".as_ptr(), 1, ptr::null(), 0, &mut out, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        assert!(!out.data.is_null());
        assert_eq!(out.len, 0);
        zreg_buffer_free(out);

        let mut out = ZregBuffer::empty();
        let status = zreg_quick_decompress(svc, ptr::null(), 0, &mut out, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        assert_eq!(take_buffer(out), Vec::<u8>::new());

        zreg_service_free(svc);
    }

    #[test]
    fn null_pointers_are_reported() {
        let svc = service("");
        let mut out = ZregBuffer::empty();
        let mut error: *mut c_char = ptr::null_mut();

        // NULL data with a non-zero length.
        let status = zreg_quick_compress(svc, ptr::null(), 16, 3, &mut out, &mut error);
        assert_eq!(status, ZregStatus::NullPointer);
        assert!(out.data.is_null());
        assert!(take_error(error).contains("data"));

        // NULL service.
        let status = zreg_quick_compress(ptr::null(), b"x".as_ptr(), 1, 3, &mut out, &mut error);
        assert_eq!(status, ZregStatus::NullPointer);
        take_error(error);

        // NULL out slot: nothing to write into, still no crash.
        let status = zreg_quick_compress(svc, b"x".as_ptr(), 1, 3, ptr::null_mut(), &mut error);
        assert_eq!(status, ZregStatus::NullPointer);
        take_error(error);

        // NULL error slot is allowed; the status still carries the kind.
        let status = zreg_close(svc, "none".as_ptr(), 4, ptr::null_mut());
        assert_eq!(status, ZregStatus::NotFound);

        zreg_service_free(svc);
        zreg_service_free(ptr::null_mut());
        assert_eq!(zreg_service_start(ptr::null()), ZregStatus::NullPointer);
    }

    #[test]
    fn errors_carry_status_and_message() {
        let svc = service("");
        assert_eq!(create(svc, "x", 23, 22), ZregStatus::InvalidParameter);
        assert_eq!(create(svc, "x", 3, 9), ZregStatus::InvalidParameter);
        assert_eq!(create(svc, "x", 3, -4), ZregStatus::InvalidParameter);
        assert_eq!(create(svc, "", 3, 22), ZregStatus::InvalidParameter);

        let bad_name = [0xffu8, 0xfe];
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_create(svc, bad_name.as_ptr(), bad_name.len(), 3, 22, &mut error);
        assert_eq!(status, ZregStatus::InvalidParameter);
        assert!(take_error(error).contains("UTF-8"));

        let (status, message) = compress(svc, "missing", b"data").unwrap_err();
        assert_eq!(status, ZregStatus::NotFound);
        assert!(message.contains("missing"));

        assert_eq!(create(svc, "d", 3, 22), ZregStatus::Ok);
        let (status, _) = decompress(svc, "d", b"not a zstd frame").unwrap_err();
        assert_eq!(status, ZregStatus::Decode);

        zreg_service_free(svc);
    }

    #[test]
    fn close_then_compress_fails() {
        let svc = service("");
        assert_eq!(create(svc, "short", 3, 22), ZregStatus::Ok);
        assert_eq!(zreg_close(svc, "short".as_ptr(), 5, ptr::null_mut()), ZregStatus::Ok);

        let (status, _) = compress(svc, "short", b"late").unwrap_err();
        assert_eq!(status, ZregStatus::NotFound);
        assert_eq!(zreg_close(svc, "short".as_ptr(), 5, ptr::null_mut()), ZregStatus::NotFound);

        zreg_service_free(svc);
    }

    #[test]
    fn stop_releases_all_entries() {
        let svc = service("");
        for name in ["a", "b", "c"] {
            assert_eq!(create(svc, name, 3, 22), ZregStatus::Ok);
        }
        assert_eq!(zreg_service_stop(svc), ZregStatus::Ok);
        for name in ["a", "b", "c"] {
            assert_eq!(compress(svc, name, b"x").unwrap_err().0, ZregStatus::NotFound);
        }

        // The service can be started again and reused.
        assert_eq!(zreg_service_start(svc), ZregStatus::Ok);
        assert_eq!(create(svc, "a", 3, 22), ZregStatus::Ok);
        assert!(compress(svc, "a", b"again").is_ok());

        zreg_service_free(svc);
    }

    #[test]
    fn unique_names_and_params() {
        let svc = service("");
        let mut name: *mut c_char = ptr::null_mut();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_create_unique(svc, 9, 20, &mut name, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        let generated = unsafe { CStr::from_ptr(name) }.to_str().unwrap().to_owned();
        zreg_string_free(name);
        assert!(generated.starts_with("compressor_"));

        let (mut level, mut window) = (0, 0);
        let status = zreg_compressor_params(
            svc,
            generated.as_ptr(),
            generated.len(),
            &mut level,
            &mut window,
            &mut error,
        );
        assert_eq!(status, ZregStatus::Ok);
        assert_eq!((level, window), (9, 20));

        zreg_service_free(svc);
    }

    #[test]
    fn zero_level_uses_configured_default() {
        let svc = service(r#"{"default_level": 19}"#);
        assert_eq!(create(svc, "implicit", 0, 22), ZregStatus::Ok);

        let name = "implicit";
        let (mut level, mut window) = (0, 0);
        let mut error: *mut c_char = ptr::null_mut();
        let status =
            zreg_compressor_params(svc, name.as_ptr(), name.len(), &mut level, &mut window, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        assert_eq!((level, window), (19, 22));

        let data = b"quick path without an explicit level. ".repeat(40);
        let mut out = ZregBuffer::empty();
        let status = zreg_quick_compress(svc, data.as_ptr(), data.len(), 0, &mut out, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        assert!(error.is_null());
        assert!(!take_buffer(out).is_empty());

        zreg_service_free(svc);
    }

    #[test]
    fn quick_path_and_counters() {
        let svc = service(r#"{"pool_capacity": 2}"#);
        let data = vec![3u8; 5000];

        let mut out = ZregBuffer::empty();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_quick_compress(svc, data.as_ptr(), data.len(), 19, &mut out, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        let compressed = take_buffer(out);

        let mut out = ZregBuffer::empty();
        let status = zreg_quick_decompress(svc, compressed.as_ptr(), compressed.len(), &mut out, &mut error);
        assert_eq!(status, ZregStatus::Ok);
        assert_eq!(take_buffer(out), data);

        let mut json: *mut c_char = ptr::null_mut();
        assert_eq!(zreg_counters_json(svc, &mut json, &mut error), ZregStatus::Ok);
        let text = unsafe { CStr::from_ptr(json) }.to_str().unwrap().to_owned();
        zreg_string_free(json);
        assert!(text.contains(r#""quick_compress_calls":1"#), "{text}");
        assert!(text.contains(r#""quick_decompress_calls":1"#), "{text}");

        zreg_service_free(svc);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = r#"{"pool_capacity": 0}"#;
        let mut out: *mut ZregService = ptr::null_mut();
        let mut error: *mut c_char = ptr::null_mut();
        let status = zreg_service_new(config.as_ptr(), config.len(), None, &mut out, &mut error);
        assert_eq!(status, ZregStatus::Config);
        assert!(out.is_null());
        assert!(take_error(error).contains("pool_capacity"));

        let config = "not json";
        let status = zreg_service_new(config.as_ptr(), config.len(), None, &mut out, &mut error);
        assert_eq!(status, ZregStatus::Config);
        take_error(error);
    }
}
