//! winget 相关数据类型定义

use serde::{Deserialize, Serialize};

/// 版本未知时 winget 输出的占位值
pub const UNKNOWN_VERSION: &str = "Unknown";

/// 命令输出结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// 启动失败、非零退出码或输出超限时的错误描述
    pub error: Option<String>,
}

impl CommandOutput {
    /// 未调用外部命令、直接给出提示的结果（如空查询）
    pub fn rejected(reason: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: reason.to_string(),
            error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// 展示给用户的消息：优先 stdout，否则 stderr
    pub fn message(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

/// winget 表格输出中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub id: String,
    pub version: String,
    /// 可升级到的版本，仅 upgrade 列表中有值
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub source: String,
}

impl PackageRecord {
    /// 只保留可信条目：ID 形如 `Publisher.Package`，且版本已知。
    ///
    /// 不含 `.` 的 ID 多为商店生成的随机标识（如 `9NBLGGH4NNS1`）。
    pub fn is_trusted(&self) -> bool {
        self.id.contains('.')
            && !self.version.is_empty()
            && !self.version.eq_ignore_ascii_case(UNKNOWN_VERSION)
    }

    /// 界面展示用的来源，空值显示为 Unknown
    pub fn source_label(&self) -> &str {
        if self.source.is_empty() {
            UNKNOWN_VERSION
        } else {
            &self.source
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, version: &str) -> PackageRecord {
        PackageRecord {
            name: "Example".to_string(),
            id: id.to_string(),
            version: version.to_string(),
            available: String::new(),
            source: String::new(),
        }
    }

    #[test]
    fn test_trusted_requires_dotted_id() {
        assert!(record("Microsoft.VisualStudioCode", "1.2.3").is_trusted());
        assert!(record("7zip.7zip", "23.01").is_trusted());
        assert!(!record("9NBLGGH4NNS1", "1.0").is_trusted());
    }

    #[test]
    fn test_unknown_version_is_untrusted_in_any_case() {
        assert!(!record("Git.Git", "Unknown").is_trusted());
        assert!(!record("Git.Git", "UNKNOWN").is_trusted());
        assert!(!record("Git.Git", "unknown").is_trusted());
        assert!(!record("Git.Git", "").is_trusted());
    }

    #[test]
    fn test_message_prefers_stdout() {
        let out = CommandOutput {
            stdout: "Successfully installed".to_string(),
            stderr: "warning".to_string(),
            error: None,
        };
        assert_eq!(out.message(), "Successfully installed");

        let out = CommandOutput::rejected("No ID provided");
        assert_eq!(out.message(), "No ID provided");
        assert!(out.success());
    }

    #[test]
    fn test_record_json_field_names() {
        let json = serde_json::to_value(record("Git.Git", "2.44.0")).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in ["name", "id", "version", "available", "source"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn test_record_optional_fields_default_to_empty() {
        let rec: PackageRecord =
            serde_json::from_str(r#"{"name":"Git","id":"Git.Git","version":"2.44.0"}"#).unwrap();
        assert_eq!(rec.available, "");
        assert_eq!(rec.source_label(), "Unknown");
    }
}
