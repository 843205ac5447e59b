//! 外部命令执行
//!
//! 参数始终以参数向量传给子进程，不经过 shell，查询词里的 `$(...)`、`;` 等不会被展开。

use super::types::CommandOutput;

/// 执行一次命令并完整捕获 stdout / stderr。
///
/// 永远不会返回错误：启动失败、非零退出码、输出超限都记录在 `CommandOutput::error` 中，
/// 由调用方决定如何展示。
pub fn run_command(program: &str, args: &[String], max_output_bytes: usize) -> CommandOutput {
    log::debug!("run_command: {} {:?}", program, args);

    let result = duct::cmd(program, args)
        .stdin_null()
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run();

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            let message = format!("failed to run {}: {}", program, e);
            log::error!("{}", message);
            return CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
                error: Some(message),
            };
        }
    };

    let (stdout, stdout_cut) = decode_capped(&output.stdout, max_output_bytes);
    let (stderr, stderr_cut) = decode_capped(&output.stderr, max_output_bytes);

    let error = if stdout_cut || stderr_cut {
        Some(format!("output exceeded {} bytes", max_output_bytes))
    } else if !output.status.success() {
        Some(match output.status.code() {
            Some(code) => format!("{} exited with code {}", program, code),
            None => format!("{} was terminated by a signal", program),
        })
    } else {
        None
    };

    if let Some(e) = &error {
        log::error!("Command error: {}", e);
    }

    CommandOutput {
        stdout,
        stderr,
        error,
    }
}

/// 按上限截断后做有损 UTF-8 解码，返回是否发生截断
fn decode_capped(bytes: &[u8], limit: usize) -> (String, bool) {
    if bytes.len() > limit {
        (String::from_utf8_lossy(&bytes[..limit]).into_owned(), true)
    } else {
        (String::from_utf8_lossy(bytes).into_owned(), false)
    }
}
