use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// winget list 的输出可能有数 MB，超过此上限视为异常
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// winget 可执行文件
    pub winget_path: String,
    /// 限定的软件源
    pub source: String,
    /// 导出 / 导入备份时的默认目录
    pub backup_dir: PathBuf,
    pub max_output_bytes: usize,
}

/// 用户主目录：HOME（类 Unix）或 USERPROFILE（Windows）
pub fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            winget_path: "winget".to_string(),
            source: "winget".to_string(),
            backup_dir: home_dir(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        home_dir().join(".config/lian-winget/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// 配置文件只读不写；文件不存在时使用默认值
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.winget_path, "winget");
        assert_eq!(config.source, "winget");
        assert_eq!(config.max_output_bytes, DEFAULT_MAX_OUTPUT_BYTES);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "winget_path = \"C:\\\\tools\\\\winget.exe\"\nbackup_dir = \"D:/backups\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.winget_path, "C:\\tools\\winget.exe");
        assert_eq!(config.backup_dir, PathBuf::from("D:/backups"));
        assert_eq!(config.source, "winget");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_output_bytes = \"lots\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
