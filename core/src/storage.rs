//! Storage bridge boundary.
//!
//! The boot stage never talks to the storage driver directly; everything
//! goes through [`StorageBridge`]. The real bridge (SD/MMC + filesystem)
//! is provided by the platform integration and is out of scope here.
//! [`RamDisk`] is the in-tree implementation: it backs the emulated
//! storage mode and every storage-facing test.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Errors surfaced by a storage bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Volume could not be mounted or is not mounted
    Unavailable,
    /// No file at the requested path
    NotFound,
    /// Read failed or returned short
    Io,
}

impl StorageError {
    /// Get a human-readable description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "Storage is unavailable",
            Self::NotFound => "File not found",
            Self::Io => "Read failed",
        }
    }
}

/// Opaque handle for an open file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(u32);

impl FileHandle {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// File access over a mounted logical volume.
///
/// `list` returns plain file names (not full paths) in a fixed order;
/// the enumeration is finite and not restartable mid-walk. Directories
/// are not recursed.
pub trait StorageBridge {
    fn mount(&mut self) -> Result<(), StorageError>;
    fn unmount(&mut self);
    fn open(&mut self, path: &str) -> Result<FileHandle, StorageError>;
    fn size(&mut self, handle: FileHandle) -> u32;
    fn read(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<(), StorageError>;
    fn close(&mut self, handle: FileHandle);
    fn exists(&mut self, path: &str) -> bool;
    fn list(&mut self, dir: &str) -> Result<Vec<String>, StorageError>;
}

/// Memory-backed volume.
///
/// Files live in a sorted map keyed by full logical path, so
/// enumeration order is stable across visits. Used for the emulated
/// storage image and for tests.
pub struct RamDisk {
    files: BTreeMap<String, Vec<u8>>,
    open: BTreeMap<u32, String>,
    next_handle: u32,
    mounted: bool,
    /// When set, mount attempts fail. Lets tests model a missing card.
    pub fail_mount: bool,
}

impl RamDisk {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            open: BTreeMap::new(),
            next_handle: 1,
            mounted: false,
            fail_mount: false,
        }
    }

    /// Add or replace a file. Usable before or after mounting.
    pub fn insert(&mut self, path: &str, data: &[u8]) {
        self.files.insert(String::from(path), Vec::from(data));
    }

    fn path_of(&self, handle: FileHandle) -> Option<&String> {
        self.open.get(&handle.raw())
    }
}

impl StorageBridge for RamDisk {
    fn mount(&mut self) -> Result<(), StorageError> {
        if self.fail_mount {
            return Err(StorageError::Unavailable);
        }
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.open.clear();
    }

    fn open(&mut self, path: &str) -> Result<FileHandle, StorageError> {
        if !self.mounted {
            return Err(StorageError::Unavailable);
        }
        if !self.files.contains_key(path) {
            return Err(StorageError::NotFound);
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.open.insert(handle, String::from(path));
        Ok(FileHandle::from_raw(handle))
    }

    fn size(&mut self, handle: FileHandle) -> u32 {
        match self.path_of(handle) {
            Some(path) => self.files[path].len() as u32,
            None => 0,
        }
    }

    fn read(&mut self, handle: FileHandle, buf: &mut [u8]) -> Result<(), StorageError> {
        let path = match self.path_of(handle) {
            Some(p) => p,
            None => return Err(StorageError::Io),
        };
        let data = &self.files[path];
        if buf.len() > data.len() {
            return Err(StorageError::Io);
        }
        buf.copy_from_slice(&data[..buf.len()]);
        Ok(())
    }

    fn close(&mut self, handle: FileHandle) {
        self.open.remove(&handle.raw());
    }

    fn exists(&mut self, path: &str) -> bool {
        self.mounted && self.files.contains_key(path)
    }

    fn list(&mut self, dir: &str) -> Result<Vec<String>, StorageError> {
        if !self.mounted {
            return Err(StorageError::Unavailable);
        }
        let prefix_owned;
        let prefix = if dir.ends_with('/') {
            dir
        } else {
            prefix_owned = alloc::format!("{}/", dir);
            prefix_owned.as_str()
        };

        let mut names = Vec::new();
        for path in self.files.keys() {
            if let Some(rest) = path.strip_prefix(prefix) {
                // Direct children only
                if !rest.is_empty() && !rest.contains('/') {
                    names.push(String::from(rest));
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk() -> RamDisk {
        let mut d = RamDisk::new();
        d.insert("sd:/bootloader/payloads/alpha.bin", b"aaaa");
        d.insert("sd:/bootloader/payloads/beta.bin", b"bb");
        d.insert("sd:/bootloader/payloads/nested/deep.bin", b"x");
        d.insert("sd:/ReiNX.bin", b"rei");
        d.mount().unwrap();
        d
    }

    #[test]
    fn test_open_read_close() {
        let mut d = disk();
        let h = d.open("sd:/ReiNX.bin").unwrap();
        assert_eq!(d.size(h), 3);
        let mut buf = [0u8; 3];
        d.read(h, &mut buf).unwrap();
        assert_eq!(&buf, b"rei");
        d.close(h);
        assert_eq!(d.size(h), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let mut d = disk();
        assert_eq!(d.open("sd:/nope.bin"), Err(StorageError::NotFound));
    }

    #[test]
    fn test_unmounted_volume_is_unavailable() {
        let mut d = disk();
        d.unmount();
        assert_eq!(d.open("sd:/ReiNX.bin"), Err(StorageError::Unavailable));
        assert!(!d.exists("sd:/ReiNX.bin"));
        assert_eq!(
            d.list("sd:/bootloader/payloads"),
            Err(StorageError::Unavailable)
        );
    }

    #[test]
    fn test_list_direct_children_only() {
        let mut d = disk();
        let names = d.list("sd:/bootloader/payloads").unwrap();
        assert_eq!(names, ["alpha.bin", "beta.bin"]);
    }

    #[test]
    fn test_list_is_idempotent() {
        let mut d = disk();
        let first = d.list("sd:/bootloader/payloads").unwrap();
        let second = d.list("sd:/bootloader/payloads").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_mount() {
        let mut d = RamDisk::new();
        d.fail_mount = true;
        assert_eq!(d.mount(), Err(StorageError::Unavailable));
    }
}
