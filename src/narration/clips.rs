/*!
 * Persistence of synthesized audio clips.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::errors::ClipError;

/// Every backend returns MPEG audio
pub const CLIP_EXTENSION: &str = "mp3";

/// Where a clip ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRef {
    /// Name used as the `src` of the reference node
    pub name: String,
    /// Location of the stored clip, if it lives on disk
    pub path: Option<PathBuf>,
}

/// Stores clip bytes under a name
#[async_trait]
pub trait ClipWriter: Send + Sync + Debug {
    async fn write(&self, name: &str, audio: Bytes) -> Result<ClipRef, ClipError>;
}

/// Derives collision-free clip names: `<base>.<seq>.mp3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipNamer {
    base: String,
    width: usize,
}

impl ClipNamer {
    pub fn new(base: impl Into<String>, width: usize) -> Self {
        Self {
            base: base.into(),
            width,
        }
    }

    /// `<base>.NNN.mp3` naming
    pub fn mp3(base: impl Into<String>) -> Self {
        Self::new(base, 3)
    }

    pub fn clip_name(&self, sequence: usize) -> String {
        format!(
            "{}.{:0width$}.{}",
            self.base,
            sequence,
            CLIP_EXTENSION,
            width = self.width
        )
    }
}

fn check_name(name: &str) -> Result<(), ClipError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ClipError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Writes clips as files into one directory
#[derive(Debug, Clone)]
pub struct FsClipWriter {
    dir: PathBuf,
}

impl FsClipWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ClipWriter for FsClipWriter {
    async fn write(&self, name: &str, audio: Bytes) -> Result<ClipRef, ClipError> {
        check_name(name)?;
        let io_err = |source| ClipError::Io {
            name: name.to_string(),
            source,
        };
        if !self.dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        }
        let path = self.dir.join(name);
        tokio::fs::write(&path, &audio).await.map_err(io_err)?;
        debug!("Wrote {} bytes to {:?}", audio.len(), path);
        Ok(ClipRef {
            name: name.to_string(),
            path: Some(path),
        })
    }
}

/// Keeps clips in memory; used by dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryClipWriter {
    clips: Mutex<BTreeMap<String, Bytes>>,
    fail_on: Option<String>,
}

impl MemoryClipWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer that refuses to store the given clip name
    pub fn failing_on(name: impl Into<String>) -> Self {
        Self {
            clips: Mutex::new(BTreeMap::new()),
            fail_on: Some(name.into()),
        }
    }

    /// Stored clip names, sorted
    pub fn names(&self) -> Vec<String> {
        self.clips.lock().keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.clips.lock().get(name).cloned()
    }
}

#[async_trait]
impl ClipWriter for MemoryClipWriter {
    async fn write(&self, name: &str, audio: Bytes) -> Result<ClipRef, ClipError> {
        check_name(name)?;
        if self.fail_on.as_deref() == Some(name) {
            return Err(ClipError::Io {
                name: name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        self.clips.lock().insert(name.to_string(), audio);
        Ok(ClipRef {
            name: name.to_string(),
            path: None,
        })
    }
}
