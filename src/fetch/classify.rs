use std::ffi::OsStr;
use std::path::Path;

/// Destination paths ending in one of these are single large files; anything
/// else is a full repository checkout. Closed set, matched case-insensitively.
const SINGLE_FILE_EXTENSIONS: &[&str] = &[
    "pth",
    "onnx",
    "pt",
    "bin",
    "safetensors",
    "ckpt",
    "vae",
    "json",
    "yaml",
    "yml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    SingleFile,
    RepositoryCheckout,
}

pub fn classify(path: &str) -> AssetKind {
    let lower = path.to_ascii_lowercase();
    let is_single_file = Path::new(&lower)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| SINGLE_FILE_EXTENSIONS.contains(&ext))
        .unwrap_or(false);

    if is_single_file {
        AssetKind::SingleFile
    } else {
        AssetKind::RepositoryCheckout
    }
}
