use encoding_rs::Encoding;
use std::ffi::OsStr;
use std::io;
use std::process::{Command, Output};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

/// 命令执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandResult {
    /// 按控制台编码解码输出
    pub fn from_output(output: Output, encoding: &'static Encoding) -> Self {
        let (stdout, _, _) = encoding.decode(&output.stdout);
        let (stderr, _, _) = encoding.decode(&output.stderr);
        CommandResult {
            success: output.status.success(),
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
            exit_code: output.status.code(),
        }
    }

    pub fn from_error(error: io::Error) -> Self {
        CommandResult {
            success: false,
            stdout: String::new(),
            stderr: error.to_string(),
            exit_code: None,
        }
    }

    /// 成功结果（测试替身使用）
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandResult {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// 失败结果（测试替身使用）
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        CommandResult {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
        }
    }

    /// 用于日志和错误信息的输出：优先 stderr，否则 stdout（sc.exe 把错误写到 stdout）
    pub fn diagnostic(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// 命令执行器
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    encoding: &'static Encoding,
}

impl CommandExecutor {
    pub fn new(encoding: &'static Encoding) -> Self {
        CommandExecutor { encoding }
    }

    /// 执行程序并记录输出
    pub fn execute<I, S>(&self, program: &str, args: I) -> CommandResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let rendered = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(command = %format!("{program} {rendered}"), "执行命令");

        let mut command = Command::new(program);
        command.args(&args);
        #[cfg(target_os = "windows")]
        command.creation_flags(0x08000000); // CREATE_NO_WINDOW

        let result = match command.output() {
            Ok(output) => CommandResult::from_output(output, self.encoding),
            Err(e) => CommandResult::from_error(e),
        };

        if !result.stdout.is_empty() {
            tracing::info!(program, stdout = %result.stdout, "命令输出");
        }
        if !result.stderr.is_empty() {
            tracing::error!(program, stderr = %result.stderr, "命令错误输出");
        }
        result
    }

    /// 启动程序后立即返回，不等待退出（打开资源管理器等）
    pub fn spawn_detached<I, S>(&self, program: &str, args: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(program);
        command.args(args);
        command.spawn().map(|_| ())
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(encoding_rs::IBM866)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_command_executor() {
        let executor = CommandExecutor::default();
        let result = executor.execute("sh", ["-c", "echo test"]);

        assert!(result.success);
        assert!(result.stdout.contains("test"));
        assert_eq!(result.exit_code, Some(0));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_failed_command_captures_stderr() {
        let executor = CommandExecutor::default();
        let result = executor.execute("sh", ["-c", "echo broken >&2; exit 3"]);

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.diagnostic(), "broken");
    }

    #[test]
    fn test_missing_program_is_reported() {
        let executor = CommandExecutor::default();
        let result = executor.execute("definitely-not-a-real-program-xyz", ["--help"]);

        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert!(!result.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_decoded_with_console_encoding() {
        use std::os::unix::process::ExitStatusExt;

        // cp866 编码的 "Ошибка"
        let output = Output {
            status: std::process::ExitStatus::from_raw(0),
            stdout: vec![0x8E, 0xE8, 0xA8, 0xA1, 0xAA, 0xA0, b'\r', b'\n'],
            stderr: Vec::new(),
        };
        let result = CommandResult::from_output(output, encoding_rs::IBM866);

        assert!(result.success);
        assert_eq!(result.stdout, "Ошибка");
        assert_eq!(result.diagnostic(), "Ошибка");
    }

    #[test]
    fn test_spawn_detached_reports_missing_program() {
        let executor = CommandExecutor::default();
        assert!(executor
            .spawn_detached("definitely-not-a-real-program-xyz", ["."])
            .is_err());
    }
}
