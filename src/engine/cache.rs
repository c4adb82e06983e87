// Flat-directory screenshot cache with freshness-token slot reservation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::debug;

use crate::config::MIN_USABLE_IMAGE_BYTES;

pub struct ThumbCache {
    dir: PathBuf,
    token_seq: AtomicU64,
}

impl ThumbCache {
    /// Open the cache directory, creating it if needed.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            token_seq: AtomicU64::new(0),
        })
    }

    pub fn png_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.png"))
    }

    pub fn jpg_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.jpg"))
    }

    /// Path to a usable cached screenshot, if one exists. Files shorter than
    /// `MIN_USABLE_IMAGE_BYTES` are tokens or truncated writes and do not
    /// count; unreadable metadata counts as absent.
    pub fn usable_png(&self, id: &str) -> Option<PathBuf> {
        let path = self.png_path(id);
        match fs::metadata(&path) {
            Ok(meta) if meta.len() >= MIN_USABLE_IMAGE_BYTES => Some(path),
            _ => None,
        }
    }

    /// Legacy pre-png entries are served as-is, no migration.
    pub fn legacy_jpg(&self, id: &str) -> Option<PathBuf> {
        let path = self.jpg_path(id);
        path.is_file().then_some(path)
    }

    /// Mint a freshness token: wall-clock millis plus a per-process monotonic
    /// sequence number, so back-to-back resolves for the same id never
    /// collide on a coarse clock.
    pub fn mint_token(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = self.token_seq.fetch_add(1, Ordering::Relaxed);
        format!("pending:{millis}:{seq}")
    }

    /// Reserve the slot for an in-flight fetch by writing the token into
    /// `{id}.png`, overwriting whatever was there.
    pub fn write_token(&self, id: &str, token: &str) -> Result<()> {
        fs::write(self.png_path(id), token)?;
        Ok(())
    }

    /// Current token in `{id}.png`. `None` when the slot holds a real image
    /// or nothing readable.
    pub fn read_token(&self, id: &str) -> Option<String> {
        let bytes = fs::read(self.png_path(id)).ok()?;
        if bytes.len() as u64 >= MIN_USABLE_IMAGE_BYTES {
            return None;
        }
        String::from_utf8(bytes).ok()
    }

    /// Whether the slot is still reserved by exactly this token.
    pub fn token_is_current(&self, id: &str, token: &str) -> bool {
        self.read_token(id).as_deref() == Some(token)
    }

    /// Commit fetched image bytes, but only while `token` is still the one
    /// on disk. Returns `false` when a newer resolve superseded this fetch.
    pub fn commit(&self, id: &str, token: &str, bytes: &[u8]) -> Result<bool> {
        if !self.token_is_current(id, token) {
            debug!("screenshot for {} superseded, dropping fetch result", id);
            return Ok(false);
        }
        fs::write(self.png_path(id), bytes)?;
        Ok(true)
    }
}
