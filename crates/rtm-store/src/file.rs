use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rtm_types::{EntityKey, VersionNumber, VersionedSnapshot};
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::memory::VersionIndex;
use crate::traits::VersionStore;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Flush/sync strategy for the version log.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SyncMode {
    /// `fsync` after every append (safest, highest latency).
    EveryWrite,
    /// Flush to the OS and rely on page-cache buffering.
    #[default]
    OsDefault,
}

/// Byte sink the log is appended to.
pub(crate) trait LogSink: Write + Send {
    /// Cut the sink back to `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

struct LogState {
    sink: Box<dyn LogSink>,
    offset: u64,
    index: VersionIndex,
    /// Set when a failed append could not be rolled back; the bytes past
    /// `offset` are unknown, so further appends are refused.
    broken: bool,
}

/// Append-only, file-backed version store.
///
/// Snapshots are serialized with bincode and framed on disk as:
///
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized VersionedSnapshot)]
/// ```
///
/// On open the file is read front-to-back into an in-memory index. A damaged
/// record is skipped by scanning forward to the next intact frame, so later
/// snapshots survive; its bytes stay on disk. The only bytes ever removed are
/// a torn final record that runs past end of file with nothing intact after
/// it.
///
/// Each append writes one whole frame. If the write or sync fails, the file
/// is cut back to where the frame started before the error is returned.
pub struct FileVersionStore {
    path: PathBuf,
    sync_mode: SyncMode,
    state: Mutex<LogState>,
}

impl FileVersionStore {
    /// Open (or create) a version log at the given path.
    pub fn open(path: &Path, sync_mode: SyncMode) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let data = fs::read(path)?;
        let recovery = recover(&data);
        let mut offset = data.len() as u64;
        if let Some(torn_at) = recovery.torn_tail {
            warn!(
                path = %path.display(),
                torn_at,
                dropped = offset - torn_at,
                "truncating torn version log tail"
            );
            file.set_len(torn_at)?;
            offset = torn_at;
        }
        info!(
            path = %path.display(),
            snapshots = recovery.index.snapshot_count(),
            damaged = recovery.damaged,
            "version log opened"
        );

        Ok(Self::from_parts(
            path.to_path_buf(),
            sync_mode,
            Box::new(file),
            recovery.index,
            offset,
        ))
    }

    fn from_parts(
        path: PathBuf,
        sync_mode: SyncMode,
        sink: Box<dyn LogSink>,
        index: VersionIndex,
        offset: u64,
    ) -> Self {
        Self {
            path,
            sync_mode,
            state: Mutex::new(LogState {
                sink,
                offset,
                index,
                broken: false,
            }),
        }
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current end-of-log byte offset.
    pub fn offset(&self) -> StoreResult<u64> {
        Ok(self.lock()?.offset)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, LogState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("version log mutex poisoned".into()))
    }
}

fn write_frame(sink: &mut dyn LogSink, frame: &[u8], sync: bool) -> io::Result<()> {
    sink.write_all(frame)?;
    sink.flush()?;
    if sync {
        sink.sync()?;
    }
    Ok(())
}

#[async_trait]
impl VersionStore for FileVersionStore {
    async fn append(&self, snapshot: &VersionedSnapshot) -> StoreResult<()> {
        let payload =
            bincode::serialize(snapshot).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);

        let mut state = self.lock()?;
        if state.broken {
            return Err(StoreError::Unavailable(format!(
                "{} has unknown bytes after a failed append; reopen to recover",
                self.path.display()
            )));
        }
        state.index.check_append(snapshot)?;

        let record_offset = state.offset;
        let sync = self.sync_mode == SyncMode::EveryWrite;
        if let Err(e) = write_frame(state.sink.as_mut(), &frame, sync) {
            match state.sink.truncate(record_offset) {
                Ok(()) => warn!(
                    key = %snapshot.key,
                    version = snapshot.version.get(),
                    offset = record_offset,
                    error = %e,
                    "append failed; version log rolled back"
                ),
                Err(rollback) => {
                    state.broken = true;
                    error!(
                        path = %self.path.display(),
                        offset = record_offset,
                        error = %e,
                        rollback_error = %rollback,
                        "append failed and could not be rolled back"
                    );
                }
            }
            return Err(e.into());
        }
        state.offset += frame.len() as u64;
        state.index.insert(snapshot.clone())?;

        debug!(
            key = %snapshot.key,
            version = snapshot.version.get(),
            offset = record_offset,
            "version appended"
        );
        Ok(())
    }

    async fn get_by_version(
        &self,
        key: &EntityKey,
        version: VersionNumber,
    ) -> StoreResult<Option<VersionedSnapshot>> {
        Ok(self.lock()?.index.get(key, version).cloned())
    }

    async fn latest_version_number(&self, key: &EntityKey) -> StoreResult<u32> {
        Ok(self.lock()?.index.latest(key))
    }

    async fn list_versions(&self, key: &EntityKey) -> StoreResult<Vec<VersionedSnapshot>> {
        Ok(self.lock()?.index.list(key))
    }

    async fn keys(&self) -> StoreResult<Vec<EntityKey>> {
        Ok(self.lock()?.index.keys())
    }
}

impl std::fmt::Debug for FileVersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileVersionStore")
            .field("path", &self.path)
            .field("sync_mode", &self.sync_mode)
            .finish()
    }
}

/// What [`recover`] found in a log.
struct Recovery {
    index: VersionIndex,
    /// Start of a torn final record, if the log ends in one.
    torn_tail: Option<u64>,
    /// Number of damaged regions skipped.
    damaged: usize,
}

#[derive(Clone, Copy)]
enum Frame<'a> {
    Intact { payload: &'a [u8], next: usize },
    /// The header or payload runs past the end of the data.
    Truncated,
    /// Zero length or CRC mismatch.
    Corrupt,
}

fn read_frame(data: &[u8], offset: usize) -> Frame<'_> {
    let Some(header) = data.get(offset..offset + HEADER_SIZE) else {
        return Frame::Truncated;
    };
    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if length == 0 {
        return Frame::Corrupt;
    }

    let start = offset + HEADER_SIZE;
    let Some(payload) = data.get(start..start + length) else {
        return Frame::Truncated;
    };
    if crc32fast::hash(payload) != expected_crc {
        return Frame::Corrupt;
    }
    Frame::Intact {
        payload,
        next: start + length,
    }
}

/// Offset of the first intact, decodable frame at or after `from`.
fn next_intact_frame(data: &[u8], from: usize) -> Option<usize> {
    (from..data.len()).find(|&offset| match read_frame(data, offset) {
        Frame::Intact { payload, .. } => {
            bincode::deserialize::<VersionedSnapshot>(payload).is_ok()
        }
        _ => false,
    })
}

/// Rebuild the index from every intact record in the log.
///
/// A damaged record is not trusted for its length: recovery resumes at the
/// next intact frame after it. A trailing record that runs past the end of
/// the data with nothing intact after it is reported as a torn tail.
fn recover(data: &[u8]) -> Recovery {
    let mut index = VersionIndex::default();
    let mut torn_tail = None;
    let mut damaged = 0;
    let mut offset = 0usize;

    while offset < data.len() {
        let frame = read_frame(data, offset);
        if let Frame::Intact { payload, next } = frame {
            match bincode::deserialize::<VersionedSnapshot>(payload) {
                Ok(snapshot) => {
                    if let Err(e) = index.insert(snapshot) {
                        warn!(offset, error = %e, "out-of-sequence version record; skipping");
                    }
                }
                Err(e) => warn!(offset, error = %e, "undecodable version record; skipping"),
            }
            offset = next;
            continue;
        }

        damaged += 1;
        match next_intact_frame(data, offset + 1) {
            Some(next) => {
                warn!(offset, resume_at = next, "damaged version record; resuming at next intact record");
                offset = next;
            }
            None => {
                if matches!(frame, Frame::Truncated) {
                    torn_tail = Some(offset as u64);
                } else {
                    warn!(offset, file_len = data.len(), "damaged version records at end of log; keeping bytes");
                }
                break;
            }
        }
    }

    debug!(recovered = index.snapshot_count(), damaged, "version log recovery complete");
    Recovery {
        index,
        torn_tail,
        damaged,
    }
}
