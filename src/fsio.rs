use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use crate::PatchError;

/// Read a text file, rejecting binary and non-UTF-8 content.
pub fn read_text(path: &Path) -> Result<String, PatchError> {
    let bytes = fs::read(path)
        .map_err(|e| PatchError::new(format!("failed to read {}: {e}", path.display())))?;
    if bytes.iter().any(|&b| b == 0) {
        return Err(PatchError::new("binary file rejected (NUL byte found)"));
    }
    String::from_utf8(bytes).map_err(|_| PatchError::new("non-UTF8 file rejected"))
}

/// Replace `path` with `content` without ever exposing a partial file.
///
/// The content goes to an exclusively created temp file in the target's
/// directory, is synced, takes over the target's permissions, and lands via
/// rename. A crash mid-write leaves the original untouched.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let perms = fs::metadata(path).map(|m| m.permissions()).ok();

    let pid = process::id();
    let mut attempt: u64 = 0;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{file_name}.anchorpatch.tmp.{pid}.{attempt}"));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut f) => {
                f.write_all(content.as_bytes())?;
                f.sync_all()?;
                if let Some(p) = perms.clone() {
                    let _ = fs::set_permissions(&candidate, p);
                }
                break candidate;
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let mut dir = env::temp_dir();
        dir.push(format!("anchorpatch-fsio-{}-{}", name, process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn read_text_rejects_nul_bytes() {
        let dir = temp_dir("nul");
        let file = dir.join("f.bin");
        fs::write(&file, b"a\0b\n").unwrap();
        let err = read_text(&file).unwrap_err();
        assert!(err.message().contains("binary"));
    }

    #[test]
    fn read_text_rejects_invalid_utf8() {
        let dir = temp_dir("utf8");
        let file = dir.join("f.txt");
        fs::write(&file, [0xff, 0xfe, b'\n']).unwrap();
        let err = read_text(&file).unwrap_err();
        assert!(err.message().contains("non-UTF8"));
    }

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_temp() {
        let dir = temp_dir("atomic");
        let file = dir.join("f.txt");
        fs::write(&file, "before\n").unwrap();

        write_atomic(&file, "after\n").unwrap();
        assert_eq!(read_text(&file).unwrap(), "after\n");

        let extras: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n != "f.txt")
            .collect();
        assert!(extras.is_empty(), "leftover temp files: {extras:?}");
    }

    #[test]
    fn write_atomic_creates_missing_target() {
        let dir = temp_dir("create");
        let file = dir.join("fresh.txt");
        write_atomic(&file, "content\n").unwrap();
        assert_eq!(read_text(&file).unwrap(), "content\n");
    }
}
