//! Process-wide font byte cache

use crate::{InvoiceError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, PoisonError, RwLock};
use tracing::debug;

/// Environment variable overriding the font asset directory
pub const FONT_DIR_ENV: &str = "INVOICE_FONT_DIR";

/// The two faces an invoice uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontVariant {
    Regular,
    Bold,
}

impl FontVariant {
    /// File name inside the font directory
    pub fn file_name(self) -> &'static str {
        match self {
            FontVariant::Regular => "DejaVuSans.ttf",
            FontVariant::Bold => "DejaVuSans-Bold.ttf",
        }
    }
}

/// Lazily loaded font files, keyed by variant
///
/// Each variant is read from disk on first use and kept for the lifetime of
/// the process. Loaded buffers are leaked so documents can borrow them as
/// `&'static [u8]`; there is one leak per variant per cache.
pub struct FontCache {
    dir: PathBuf,
    loaded: RwLock<HashMap<FontVariant, &'static [u8]>>,
}

impl FontCache {
    /// Create a cache reading from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// The shared cache used by `render_invoice_pdf`
    ///
    /// Reads from `INVOICE_FONT_DIR` when set at first use, otherwise from the
    /// bundled `assets/fonts` directory.
    pub fn global() -> &'static FontCache {
        static GLOBAL: OnceLock<FontCache> = OnceLock::new();
        GLOBAL.get_or_init(|| FontCache::new(default_font_dir()))
    }

    /// Directory fonts are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True once `variant` has been read
    pub fn is_loaded(&self, variant: FontVariant) -> bool {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&variant)
    }

    /// Get the raw font file for a variant
    ///
    /// Two threads racing on the first load may both read the file; the first
    /// to finish is kept and the other buffer is dropped.
    pub fn get_font_bytes(&self, variant: FontVariant) -> Result<&'static [u8]> {
        if let Some(bytes) = self
            .loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&variant)
            .copied()
        {
            return Ok(bytes);
        }

        let path = self.dir.join(variant.file_name());
        let data = std::fs::read(&path).map_err(|source| InvoiceError::FontAsset {
            path: path.clone(),
            source,
        })?;
        debug!(?variant, path = %path.display(), bytes = data.len(), "loaded font");

        let mut loaded = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        let bytes = *loaded
            .entry(variant)
            .or_insert_with(|| Box::leak(data.into_boxed_slice()));

        Ok(bytes)
    }
}

fn default_font_dir() -> PathBuf {
    std::env::var_os(FONT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/fonts"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> FontCache {
        FontCache::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/fonts"))
    }

    #[test]
    fn test_loads_each_variant_once() {
        let cache = bundled();
        assert!(!cache.is_loaded(FontVariant::Regular));

        let first = cache.get_font_bytes(FontVariant::Regular).unwrap();
        let second = cache.get_font_bytes(FontVariant::Regular).unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(cache.is_loaded(FontVariant::Regular));
        assert!(!cache.is_loaded(FontVariant::Bold));
    }

    #[test]
    fn test_variants_differ() {
        let cache = bundled();
        let regular = cache.get_font_bytes(FontVariant::Regular).unwrap();
        let bold = cache.get_font_bytes(FontVariant::Bold).unwrap();
        assert_ne!(regular, bold);
    }

    #[test]
    fn test_missing_directory_is_font_asset_error() {
        let cache = FontCache::new("/definitely/not/a/font/dir");
        match cache.get_font_bytes(FontVariant::Bold) {
            Err(InvoiceError::FontAsset { path, .. }) => {
                assert!(path.ends_with("DejaVuSans-Bold.ttf"));
            }
            other => panic!("expected FontAsset error, got {other:?}"),
        }
        assert!(!cache.is_loaded(FontVariant::Bold));
    }
}
