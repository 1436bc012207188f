//! 外部命令执行
//!
//! 所有对 `ip`/`tc`/cgroup 的操作都经由这里，可选地加 `sudo` 前缀。

use std::io;
use std::process::{Command, Output};

use tracing::trace;

use super::EmuError;

/// 命令执行器
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    pub sudo: bool,
}

impl Runner {
    /// 执行命令并返回原始输出，不检查退出码
    pub fn run(&self, args: &[&str]) -> Result<Output, EmuError> {
        let (program, rest) = if self.sudo {
            ("sudo", args)
        } else {
            match args.split_first() {
                Some((first, rest)) => (*first, rest),
                None => {
                    return Err(EmuError::Io {
                        cmd: String::new(),
                        source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
                    });
                }
            }
        };
        trace!(cmd = %render(args), "执行命令");
        Command::new(program)
            .args(rest)
            .output()
            .map_err(|source| EmuError::Io {
                cmd: render(args),
                source,
            })
    }

    /// 执行命令，退出码非零时带上 stderr 报错
    pub fn run_checked(&self, args: &[&str]) -> Result<Output, EmuError> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(EmuError::Command {
                cmd: render(args),
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

pub(crate) fn render(args: &[&str]) -> String {
    args.join(" ")
}
