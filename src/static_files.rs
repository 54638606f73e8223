use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

const INDEX_FILE: &str = "index.html";

#[derive(Debug, Error)]
pub(crate) enum AssetError {
    #[error("path escapes the public directory")]
    Forbidden,
    #[error("asset not found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub(crate) struct Asset {
    pub(crate) bytes: Vec<u8>,
    pub(crate) content_type: &'static str,
}

/// Reads the file a request path points at inside `public_dir`.
pub(crate) fn load_asset(public_dir: &Path, request_path: &str) -> Result<Asset, AssetError> {
    let resolved = resolve_asset_path(public_dir, request_path)?;
    let bytes = std::fs::read(&resolved).map_err(|err| match err.kind() {
        ErrorKind::NotFound | ErrorKind::IsADirectory => AssetError::NotFound,
        _ => AssetError::Io(err),
    })?;
    Ok(Asset {
        bytes,
        content_type: content_type_for_path(&resolved),
    })
}

pub(crate) fn resolve_asset_path(
    public_dir: &Path,
    request_path: &str,
) -> Result<PathBuf, AssetError> {
    let decoded = urlencoding::decode(request_path).map_err(|_| AssetError::NotFound)?;
    let rel_path = request_path_to_relative(&decoded)?;

    let root = std::fs::canonicalize(public_dir).map_err(|err| match err.kind() {
        ErrorKind::NotFound => AssetError::NotFound,
        _ => AssetError::Io(err),
    })?;
    let mut resolved = canonicalize_within(&root, &root.join(rel_path))?;
    if resolved.is_dir() {
        resolved = canonicalize_within(&root, &resolved.join(INDEX_FILE))?;
    }
    if !resolved.is_file() {
        return Err(AssetError::NotFound);
    }
    Ok(resolved)
}

fn canonicalize_within(root: &Path, path: &Path) -> Result<PathBuf, AssetError> {
    let resolved = std::fs::canonicalize(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => AssetError::NotFound,
        _ => AssetError::Io(err),
    })?;
    if !resolved.starts_with(root) {
        return Err(AssetError::Forbidden);
    }
    Ok(resolved)
}

fn request_path_to_relative(request_path: &str) -> Result<PathBuf, AssetError> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        return request_path_to_relative(&format!("{trimmed}{INDEX_FILE}"));
    }
    if trimmed.contains('\0') || trimmed.contains('\\') {
        return Err(AssetError::Forbidden);
    }

    let mut components = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => components.push(part),
            Component::CurDir => {}
            _ => return Err(AssetError::Forbidden),
        }
    }
    if components.is_empty() {
        return Ok(PathBuf::from(INDEX_FILE));
    }
    Ok(components.iter().collect())
}

pub(crate) fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}
