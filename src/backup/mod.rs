//! 软件包备份：导出到加密文件 / 从加密文件导入

pub mod codec;

use crate::package_manager::PackageRecord;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 备份文件扩展名
pub const BACKUP_EXTENSION: &str = "wgpkgs";

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("No packages to export.")]
    Empty,

    #[error("{0}")]
    Codec(#[from] codec::CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 导出成功后的摘要
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub count: usize,
    pub path: PathBuf,
}

impl ExportSummary {
    pub fn message(&self) -> String {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        format!("Successfully exported {} packages to {}", self.count, file_name)
    }
}

/// 默认导出路径: <dir>/mypackages.wgpkgs
pub fn default_path(dir: &Path) -> PathBuf {
    dir.join(format!("mypackages.{}", BACKUP_EXTENSION))
}

/// 强制使用备份扩展名
pub fn with_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext == BACKUP_EXTENSION => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(BACKUP_EXTENSION);
            PathBuf::from(name)
        }
    }
}

/// 加密写入所选包，文件内容即编码结果
pub fn export_to_file(records: &[PackageRecord], path: &Path) -> Result<ExportSummary, BackupError> {
    if records.is_empty() {
        return Err(BackupError::Empty);
    }

    let path = with_extension(path);
    let blob = codec::encode(records)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&path, blob)?;

    Ok(ExportSummary {
        count: records.len(),
        path,
    })
}

/// 读取并解密备份文件
pub fn import_from_file(path: &Path) -> Result<Vec<PackageRecord>, BackupError> {
    let blob = fs::read_to_string(path)?;
    codec::decode(&blob).map_err(|e| {
        log::warn!("导入 {} 失败: {}", path.display(), e);
        BackupError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn records() -> Vec<PackageRecord> {
        vec![
            PackageRecord {
                name: "Git".to_string(),
                id: "Git.Git".to_string(),
                version: "2.44.0".to_string(),
                available: String::new(),
                source: "winget".to_string(),
            },
            PackageRecord {
                name: "Node.js LTS".to_string(),
                id: "OpenJS.NodeJS.LTS".to_string(),
                version: "20.11.1".to_string(),
                available: String::new(),
                source: "winget".to_string(),
            },
        ]
    }

    #[test]
    fn test_export_then_import() {
        let dir = TempDir::new().unwrap();
        let summary = export_to_file(&records(), &dir.path().join("mine")).unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.path, dir.path().join("mine.wgpkgs"));
        assert_eq!(
            summary.message(),
            "Successfully exported 2 packages to mine.wgpkgs"
        );
        assert_eq!(import_from_file(&summary.path).unwrap(), records());
    }

    #[test]
    fn test_file_content_is_the_blob() {
        let dir = TempDir::new().unwrap();
        let summary = export_to_file(&records(), &default_path(dir.path())).unwrap();
        let content = fs::read_to_string(&summary.path).unwrap();
        assert_eq!(content.matches(':').count(), 1);
        assert!(!content.contains("Git.Git"));
    }

    #[test]
    fn test_empty_selection_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = default_path(dir.path());
        let err = export_to_file(&[], &path).unwrap_err();
        assert!(matches!(err, BackupError::Empty));
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_reports_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.wgpkgs");
        fs::write(&path, "not a backup").unwrap();

        let err = import_from_file(&path).unwrap_err();
        assert!(matches!(err, BackupError::Codec(_)));
        assert!(err.to_string().starts_with("Invalid file or corruption"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = import_from_file(&dir.path().join("missing.wgpkgs")).unwrap_err();
        assert!(matches!(err, BackupError::Io(_)));
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension(Path::new("a.wgpkgs")), PathBuf::from("a.wgpkgs"));
        assert_eq!(with_extension(Path::new("a")), PathBuf::from("a.wgpkgs"));
        assert_eq!(with_extension(Path::new("a.txt")), PathBuf::from("a.txt.wgpkgs"));
    }
}
