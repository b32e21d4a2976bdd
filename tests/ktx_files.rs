use std::env;
use std::fs;
use std::path::PathBuf;

use glsamples::ktx;

fn temp_path(name: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("glsamples-{}-{}", std::process::id(), name));
    path
}

/// A minimal single-level RGBA8 file in host byte order.
fn rgba8_file(width: u32, height: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&ktx::IDENTIFIER);
    let words = [
        0x0403_0201u32, // endianness marker
        0x1401,         // gl_type: UNSIGNED_BYTE
        1,              // gl_type_size
        0x1908,         // gl_format: RGBA
        0x8058,         // gl_internal_format: RGBA8
        0x1908,         // gl_base_internal_format
        width,
        height,
        0, // depth
        0, // array_elements
        1, // faces
        1, // mip_levels
        0, // no key/value data
        payload.len() as u32,
    ];
    for &word in &words {
        out.extend_from_slice(&word.to_ne_bytes());
    }
    out.extend_from_slice(payload);
    out.resize((out.len() + 3) & !3, 0);
    out
}

#[test]
fn opens_a_file_from_disk() {
    let path = temp_path("valid.ktx");
    let payload = vec![0x5A; 2 * 2 * 4];
    fs::write(&path, rgba8_file(2, 2, &payload)).unwrap();

    let file = ktx::open(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(file.header.width, 2);
    assert_eq!(file.header.height, 2);
    assert_eq!(file.levels.len(), 1);
    assert_eq!(file.levels[0], payload);
    assert_eq!(file.header.target().unwrap(), ktx::Target::Texture2d);
}

#[test]
fn missing_files_name_the_path() {
    let err = ktx::open("/nonexistent/texture.ktx").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/texture.ktx"));
}

#[test]
fn garbage_files_are_an_error() {
    let path = temp_path("garbage.ktx");
    fs::write(&path, b"not a ktx container").unwrap();

    let result = ktx::open(&path);
    fs::remove_file(&path).unwrap();

    assert!(result.is_err());
}
