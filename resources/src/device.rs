use std::{
    collections::BTreeMap,
    fs, io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::DeviceError;

/// Read access to resource files. Paths are `/`-separated and relative to
/// the device root.
pub trait ResourceDevice {
    fn read(&self, path: &str) -> Result<Vec<u8>, DeviceError>;

    fn exists(&self, path: &str) -> bool;

    /// Names of the directories directly below `path`, sorted.
    fn list_directories(&self, path: &str) -> Result<Vec<String>, DeviceError>;
}

pub fn join_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Strips leading separators and refuses `..` and absolute components.
fn relative_path(path: &str) -> Result<&str, DeviceError> {
    let relative = path.trim_start_matches('/');
    let contained = Path::new(relative)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if contained {
        Ok(relative)
    } else {
        Err(DeviceError::OutsideRoot {
            path: path.to_string(),
        })
    }
}

/// Device backed by a directory of the local filesystem.
pub struct LocalDevice {
    root: PathBuf,
}

impl LocalDevice {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, DeviceError> {
        Ok(self.root.join(relative_path(path)?))
    }
}

fn device_error(path: &str, error: io::Error) -> DeviceError {
    match error.kind() {
        io::ErrorKind::NotFound => DeviceError::NotFound {
            path: path.to_string(),
        },
        _ => DeviceError::Io {
            path: path.to_string(),
            reason: error.to_string(),
        },
    }
}

impl ResourceDevice for LocalDevice {
    fn read(&self, path: &str) -> Result<Vec<u8>, DeviceError> {
        fs::read(self.resolve(path)?).map_err(|error| device_error(path, error))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map_or(false, |path| path.exists())
    }

    fn list_directories(&self, path: &str) -> Result<Vec<String>, DeviceError> {
        let entries = fs::read_dir(self.resolve(path)?).map_err(|error| device_error(path, error))?;

        let mut directories = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| device_error(path, error))?;
            let is_dir = entry
                .file_type()
                .map_err(|error| device_error(path, error))?
                .is_dir();
            if is_dir {
                if let Some(name) = entry.file_name().to_str() {
                    directories.push(name.to_string());
                }
            }
        }
        directories.sort();
        Ok(directories)
    }
}

/// In-memory device. Clones share the same files, so content can be changed
/// after the device was handed to a manager.
#[derive(Clone, Default)]
pub struct MemoryDevice {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .insert(path.trim_start_matches('/').to_string(), contents.into());
    }

    pub fn remove(&self, path: &str) -> bool {
        self.files
            .lock()
            .remove(path.trim_start_matches('/'))
            .is_some()
    }
}

impl ResourceDevice for MemoryDevice {
    fn read(&self, path: &str) -> Result<Vec<u8>, DeviceError> {
        self.files
            .lock()
            .get(relative_path(path)?)
            .cloned()
            .ok_or_else(|| DeviceError::NotFound {
                path: path.to_string(),
            })
    }

    fn exists(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/').trim_end_matches('/');
        let prefix = format!("{}/", path);
        self.files
            .lock()
            .keys()
            .any(|file| file == path || file.starts_with(&prefix))
    }

    fn list_directories(&self, path: &str) -> Result<Vec<String>, DeviceError> {
        let path = path.trim_start_matches('/').trim_end_matches('/');
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut directories: Vec<String> = self
            .files
            .lock()
            .keys()
            .filter_map(|file| file.strip_prefix(&prefix))
            .filter_map(|rest| rest.split_once('/').map(|(dir, _)| dir.to_string()))
            .collect();
        directories.sort();
        directories.dedup();

        if directories.is_empty() && !path.is_empty() && !self.exists(path) {
            return Err(DeviceError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(directories)
    }
}
