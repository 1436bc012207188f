//! 网络命名空间
//!
//! 每个拓扑节点对应一个 Linux network namespace，drop 时连同其中的进程一起清理。

use std::process::Output;

use tracing::{debug, warn};

use super::EmuError;
use super::cmd::Runner;

/// 带 RAII 清理的 network namespace
#[derive(Debug)]
pub struct Namespace {
    name: String,
    runner: Runner,
}

impl Namespace {
    pub fn new(name: impl Into<String>, runner: Runner) -> Result<Self, EmuError> {
        let name = name.into();
        // 同名残留先删掉
        let _ = runner.run(&["ip", "netns", "del", &name]);
        runner.run_checked(&["ip", "netns", "add", &name])?;
        debug!(ns = %name, "创建 network namespace");

        let ns = Self { name, runner };
        ns.exec_checked("ip", &["link", "set", "lo", "up"])?;
        Ok(ns)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 在命名空间内执行命令，退出码非零时报错
    pub fn exec_checked(&self, cmd: &str, args: &[&str]) -> Result<Output, EmuError> {
        self.runner.run_checked(&self.full_args(cmd, args))
    }

    /// 结束命名空间内的所有进程（例如后台的 iperf 服务端）
    pub fn kill_all(&self) {
        let Ok(out) = self.runner.run(&["ip", "netns", "pids", &self.name]) else {
            return;
        };
        let stdout = String::from_utf8_lossy(&out.stdout);
        for pid in stdout.split_whitespace() {
            let _ = self.runner.run(&["kill", "-9", pid]);
        }
    }

    fn full_args<'a>(&'a self, cmd: &'a str, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = vec!["ip", "netns", "exec", self.name.as_str(), cmd];
        full.extend_from_slice(args);
        full
    }
}

impl Drop for Namespace {
    fn drop(&mut self) {
        debug!(ns = %self.name, "删除 network namespace");
        self.kill_all();
        if let Err(err) = self.runner.run_checked(&["ip", "netns", "del", &self.name]) {
            warn!(ns = %self.name, %err, "删除 network namespace 失败");
        }
    }
}
