//! 仿真驱动模块
//!
//! 拓扑描述在这里被实例化为真实的（或模拟的）网络。验证阶段只依赖
//! `Emulator` / `EmuHost` 两个 trait，Linux 下的实现是 `NetnsEmulator`。

mod cgroup;
mod cmd;
mod error;
mod namespace;
mod netns;
mod shaping;

use std::net::Ipv4Addr;

use crate::net::Topology;

pub use cgroup::{CPU_PERIOD_US, HostCgroup, cpu_max_value};
pub use cmd::Runner;
pub use error::EmuError;
pub use namespace::Namespace;
pub use netns::{NetnsEmulator, NetnsHost, NetnsOpts, has_switch_cycle, host_ip, iface_name};
pub use shaping::{tbf_burst_bytes, tc_commands};

/// 已实例化的主机
pub trait EmuHost {
    /// 主机标签（`h1`、`h2` ...）
    fn name(&self) -> &str;

    fn ip(&self) -> Ipv4Addr;

    /// 在主机上执行一行 shell 命令，返回合并后的 stdout/stderr
    ///
    /// 退出码非零时返回 `EmuError::Command`，其中带着命令输出。
    fn cmd(&self, line: &str) -> Result<String, EmuError>;
}

/// 仿真驱动
///
/// 只读借用拓扑描述并把它实例化；描述本身不会被修改。
pub trait Emulator {
    type Host: EmuHost;

    fn start(&mut self, topo: &Topology) -> Result<(), EmuError>;

    /// 主机，顺序与拓扑描述中的主机顺序一致
    fn hosts(&self) -> &[Self::Host];

    fn stop(&mut self) -> Result<(), EmuError>;
}
