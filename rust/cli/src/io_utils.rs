//! File helpers shared by the commands.
//!
//! Recordings and snapshot files may be Zstandard-compressed; any path ending in
//! `.zst` is decompressed on read. A leading UTF-8 BOM is dropped.

use std::path::Path;

/// Read a text file, decompressing `.zst` paths.
///
/// ```rust,no_run
/// # use pokerfelt_cli::io_utils::read_text_auto;
/// let plain = read_text_auto("snapshot.json").unwrap();
/// let packed = read_text_auto("session.jsonl.zst").unwrap();
/// ```
pub fn read_text_auto(path: &str) -> Result<String, String> {
    let mut content = if is_compressed(path) {
        let file = std::fs::File::open(path).map_err(|e| format!("{}: {}", path, e))?;
        let dec = zstd::stream::decode_all(file).map_err(|e| format!("{}: {}", path, e))?;
        String::from_utf8(dec).map_err(|e| format!("{}: {}", path, e))?
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?
    };
    strip_utf8_bom(&mut content);
    Ok(content)
}

pub fn is_compressed(path: &str) -> bool {
    path.ends_with(".zst")
}

/// Ensure parent directory exists for given path, creating if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}
