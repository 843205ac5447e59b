//! 包管理器模块：对 winget 命令行的封装

pub mod batch;
pub mod parser;
pub mod runner;
pub mod types;

// 重新导出常用类型和函数
pub use batch::{install_all, BatchEvent, BatchReport};
pub use types::{CommandOutput, PackageRecord};

use crate::config::Config;
use anyhow::{anyhow, Result};
use parser::{clean_terminal_output, parse_packages};
use runner::run_command;

/// 安装 / 升级时自动接受协议，避免交互提示阻塞
const AGREEMENT_FLAGS: [&str; 2] = ["--accept-package-agreements", "--accept-source-agreements"];

#[derive(Debug, Clone)]
pub struct Winget {
    pub program: String,
    /// 唯一信任的软件源，所有查询和安装都限定在这个源
    pub source: String,
    pub max_output_bytes: usize,
}

impl Winget {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.winget_path.clone(),
            source: config.source.clone(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.program
    }

    /// 检测 winget 是否可用，返回版本号
    pub fn detect(&self) -> Result<String> {
        let output = self.run(&["--version".to_string()]);
        match output.error {
            None => Ok(output.stdout.trim().to_string()),
            Some(e) => Err(anyhow!("未找到 winget: {}", e)),
        }
    }

    fn run(&self, args: &[String]) -> CommandOutput {
        run_command(&self.program, args, self.max_output_bytes)
    }

    fn source_args(&self) -> [String; 2] {
        ["--source".to_string(), self.source.clone()]
    }

    fn id_args(&self, subcommand: &str, id: &str) -> Vec<String> {
        let mut args = vec![subcommand.to_string(), "--id".to_string(), id.to_string()];
        args.extend(self.source_args());
        args.extend(AGREEMENT_FLAGS.iter().map(|s| s.to_string()));
        args
    }

    // ===== 查询 =====

    /// 列出可升级的包 (winget upgrade)
    pub fn check_updates(&self) -> CommandOutput {
        let mut args = vec!["upgrade".to_string()];
        args.extend(self.source_args());
        self.run(&args)
    }

    /// 列出已安装的包 (winget list)
    pub fn list_installed(&self) -> CommandOutput {
        let mut args = vec!["list".to_string()];
        args.extend(self.source_args());
        self.run(&args)
    }

    /// 搜索远程仓库 (winget search)
    pub fn search(&self, query: &str) -> CommandOutput {
        if query.trim().is_empty() {
            return CommandOutput::rejected("No query provided");
        }
        let mut args = vec!["search".to_string(), query.to_string()];
        args.extend(self.source_args());
        self.run(&args)
    }

    // ===== 变更 =====

    pub fn install(&self, id: &str) -> CommandOutput {
        if id.trim().is_empty() {
            return CommandOutput::rejected("No ID provided");
        }
        self.run(&self.id_args("install", id))
    }

    pub fn upgrade(&self, id: &str) -> CommandOutput {
        if id.trim().is_empty() {
            return CommandOutput::rejected("No ID provided");
        }
        self.run(&self.id_args("upgrade", id))
    }

    /// 卸载不限定软件源
    pub fn uninstall(&self, id: &str) -> CommandOutput {
        if id.trim().is_empty() {
            return CommandOutput::rejected("No ID provided");
        }
        self.run(&["uninstall".to_string(), "--id".to_string(), id.to_string()])
    }

    // ===== 查询 + 解析 =====

    pub fn fetch_updates(&self) -> (Vec<PackageRecord>, CommandOutput) {
        with_records(self.check_updates())
    }

    pub fn fetch_installed(&self) -> (Vec<PackageRecord>, CommandOutput) {
        with_records(self.list_installed())
    }

    pub fn fetch_search(&self, query: &str) -> (Vec<PackageRecord>, CommandOutput) {
        with_records(self.search(query))
    }
}

/// 即使命令失败也尝试解析 stdout，winget 在部分失败时仍会输出表格
fn with_records(output: CommandOutput) -> (Vec<PackageRecord>, CommandOutput) {
    let records = parse_packages(&clean_terminal_output(&output.stdout));
    (records, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winget(program: &str) -> Winget {
        Winget {
            program: program.to_string(),
            source: "winget".to_string(),
            max_output_bytes: 1024 * 1024,
        }
    }

    #[test]
    fn test_install_args() {
        let args = winget("winget").id_args("install", "Git.Git");
        assert_eq!(
            args,
            vec![
                "install",
                "--id",
                "Git.Git",
                "--source",
                "winget",
                "--accept-package-agreements",
                "--accept-source-agreements"
            ]
        );
    }

    #[test]
    fn test_empty_inputs_skip_the_tool() {
        // 不存在的程序：若真的被调用会产生 error
        let wg = winget("lian-winget-no-such-program");
        for out in [wg.search("  "), wg.install(""), wg.upgrade(""), wg.uninstall(" ")] {
            assert!(out.success());
            assert!(out.stdout.is_empty());
        }
        assert_eq!(wg.search("").stderr, "No query provided");
        assert_eq!(wg.install("").stderr, "No ID provided");
    }

    #[test]
    fn test_missing_tool_yields_empty_records() {
        let (records, output) = winget("lian-winget-no-such-program").fetch_installed();
        assert!(records.is_empty());
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_search_passes_query_as_single_argument() {
        // echo 会原样回显参数向量
        let out = winget("echo").search("$(date) foo");
        assert_eq!(out.stdout.trim(), "search $(date) foo --source winget");
    }

    #[cfg(unix)]
    #[test]
    fn test_uninstall_has_no_source_constraint() {
        let out = winget("echo").uninstall("Git.Git");
        assert_eq!(out.stdout.trim(), "uninstall --id Git.Git");
    }

    #[test]
    fn test_detect_missing_tool() {
        assert!(winget("lian-winget-no-such-program").detect().is_err());
    }
}
