//! File server repositories that projects store their files in.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{new_entity_id, EntityId};

/// Operating system family, used to pick a repository root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Osx,
}

impl Platform {
    /// The platform this process runs on. Unknown targets map to Linux.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::Osx,
            _ => Platform::Linux,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub id: EntityId,
    pub name: String,
    pub linux_path: String,
    pub windows_path: String,
    pub osx_path: String,
}

/// DTO for creating a repository. Paths default to empty.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateRepository {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub linux_path: String,
    #[serde(default)]
    pub windows_path: String,
    #[serde(default)]
    pub osx_path: String,
}

impl Repository {
    pub fn create(input: CreateRepository) -> Result<Self, CoreError> {
        input.validate()?;
        Ok(Self {
            id: new_entity_id(),
            name: input.name,
            linux_path: normalize_root(input.linux_path),
            windows_path: normalize_root(input.windows_path),
            osx_path: normalize_root(input.osx_path),
        })
    }

    /// Repository root on `platform`.
    pub fn path_for(&self, platform: Platform) -> &str {
        match platform {
            Platform::Linux => &self.linux_path,
            Platform::Windows => &self.windows_path,
            Platform::Osx => &self.osx_path,
        }
    }

    /// Repository root on the current platform.
    pub fn path(&self) -> &str {
        self.path_for(Platform::current())
    }
}

/// Forward slashes and a single trailing slash; empty stays empty.
fn normalize_root(path: String) -> String {
    if path.is_empty() {
        return path;
    }
    let path = path.replace('\\', "/");
    format!("{}/", path.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_normalized() {
        let repo = Repository::create(CreateRepository {
            name: "Test Repo".to_string(),
            linux_path: "/mnt/T".to_string(),
            windows_path: "T:\\projects\\".to_string(),
            osx_path: "/Volumes/T//".to_string(),
        })
        .unwrap();
        assert_eq!(repo.path_for(Platform::Linux), "/mnt/T/");
        assert_eq!(repo.path_for(Platform::Windows), "T:/projects/");
        assert_eq!(repo.path_for(Platform::Osx), "/Volumes/T/");
    }

    #[test]
    fn name_is_required() {
        assert!(Repository::create(CreateRepository::default()).is_err());
    }

    #[test]
    fn empty_paths_stay_empty() {
        let repo = Repository::create(CreateRepository {
            name: "Test Repo".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(repo.path(), "");
    }
}
