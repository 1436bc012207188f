//! 主机 CPU 限额（cgroup v2 `cpu.max`）

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::EmuError;
use super::cmd::Runner;

/// cgroup v2 挂载点
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";
/// `cpu.max` 的周期（微秒）
pub const CPU_PERIOD_US: u64 = 100_000;
/// 内核允许的最小配额（微秒）
const MIN_QUOTA_US: u64 = 1_000;

/// 根据份额计算 `cpu.max` 的取值
///
/// 份额是相对整机 CPU 的比例，所以配额要乘以 CPU 数。份额不小于 1 时不限制。
pub fn cpu_max_value(share: f64, ncpu: usize, period_us: u64) -> String {
    if !share.is_finite() || share >= 1.0 || share <= 0.0 {
        return format!("max {period_us}");
    }
    let quota = (share * period_us as f64 * ncpu.max(1) as f64).round() as u64;
    format!("{} {period_us}", quota.max(MIN_QUOTA_US))
}

/// 一台主机的 cgroup
#[derive(Debug)]
pub struct HostCgroup {
    path: PathBuf,
    runner: Runner,
}

impl HostCgroup {
    pub fn create(name: &str, share: f64, runner: Runner) -> Result<Self, EmuError> {
        let path = Path::new(CGROUP_ROOT).join(name);
        let dir = path.to_string_lossy().into_owned();
        runner.run_checked(&["mkdir", "-p", &dir])?;

        let ncpu = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let value = cpu_max_value(share, ncpu, CPU_PERIOD_US);
        let write = format!("echo '{value}' > {dir}/cpu.max");
        runner.run_checked(&["sh", "-c", &write])?;
        debug!(cgroup = %dir, cpu_max = %value, "设置主机 CPU 限额");

        Ok(Self::attach(path, runner))
    }

    /// 接管一个已存在的 cgroup 目录，drop 时删除
    pub(crate) fn attach(path: PathBuf, runner: Runner) -> Self {
        Self { path, runner }
    }

    /// 进程加入 cgroup 的 shell 前缀
    pub fn enter_prefix(&self) -> String {
        format!("echo $$ > {}/cgroup.procs && ", self.path.display())
    }

    /// 删除 cgroup 目录；里面还有进程时内核返回 EBUSY
    pub fn remove(&self) -> Result<(), EmuError> {
        let dir = self.path.to_string_lossy().into_owned();
        self.runner.run_checked(&["rmdir", dir.as_str()])?;
        Ok(())
    }
}

impl Drop for HostCgroup {
    fn drop(&mut self) {
        if let Err(err) = self.remove() {
            warn!(cgroup = %self.path.display(), %err, "删除 cgroup 失败，目录残留");
        }
    }
}
