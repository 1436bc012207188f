//! 性能验证模块
//!
//! 在已启动的仿真网络上依次执行：主机接口信息转储、全对 ping、全对 iperf。
//! 所有探测严格串行，单个探测失败只记录，不会中断整个流程。

mod iperf;
mod ping;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::emu::{EmuError, EmuHost, Emulator};
use crate::net::Topology;
use crate::topo::{self, TopoError, TopoOpts, TopologyKind};

pub use iperf::{BandwidthProbe, bandwidth_all, iperf_command};
pub use ping::{PingProbe, PingSummary, parse_received, ping_all, ping_command};

/// 默认 iperf 测试时长（秒）
pub const DEFAULT_IPERF_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum PerfError {
    #[error(transparent)]
    Topo(#[from] TopoError),
    #[error(transparent)]
    Emu(#[from] EmuError),
}

/// 验证流程选项
#[derive(Debug, Clone)]
pub struct PerfOpts {
    pub iperf_secs: u64,
    pub dump_hosts: bool,
}

impl Default for PerfOpts {
    fn default() -> Self {
        Self {
            iperf_secs: DEFAULT_IPERF_SECS,
            dump_hosts: true,
        }
    }
}

/// 主机接口信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostDump {
    pub host: String,
    pub ip: String,
    pub interfaces: String,
}

/// 一次完整验证的结果
#[derive(Debug, Clone, Serialize)]
pub struct PerfReport {
    pub topology: TopologyKind,
    pub hosts: Vec<HostDump>,
    pub ping: PingSummary,
    pub bandwidth: Vec<BandwidthProbe>,
}

/// 在每台主机上执行 `ifconfig`（输出为空时退回 `ip addr`）
pub fn dump_hosts<H: EmuHost>(hosts: &[H]) -> Vec<HostDump> {
    hosts
        .iter()
        .map(|host| {
            let interfaces = match host.cmd("ifconfig") {
                Ok(out) if !out.trim().is_empty() => out,
                _ => host.cmd("ip addr").unwrap_or_else(|err| {
                    warn!(host = %host.name(), %err, "无法获取接口信息");
                    String::new()
                }),
            };
            info!("{}\n{}", host.name(), interfaces);
            HostDump {
                host: host.name().to_string(),
                ip: host.ip().to_string(),
                interfaces,
            }
        })
        .collect()
}

/// 在已构建的拓扑上跑完整的验证流程
///
/// 启动失败直接返回错误；启动之后的步骤都在本地恢复，最后总会停止网络。
#[tracing::instrument(skip_all, fields(topology = %topo.kind()))]
pub fn validate<E: Emulator>(
    topo: &Topology,
    opts: &PerfOpts,
    emu: &mut E,
) -> Result<PerfReport, PerfError> {
    info!("*** Starting network");
    emu.start(topo)?;

    let hosts = emu.hosts();
    let dumps = if opts.dump_hosts {
        info!("*** Dumping host connections");
        dump_hosts(hosts)
    } else {
        hosts
            .iter()
            .map(|h| HostDump {
                host: h.name().to_string(),
                ip: h.ip().to_string(),
                interfaces: String::new(),
            })
            .collect()
    };

    info!("*** Testing network connectivity");
    let ping = ping_all(hosts);

    info!("*** Testing pairwise bandwidths");
    let bandwidth = bandwidth_all(hosts, opts.iperf_secs);

    info!("*** Stopping network");
    if let Err(err) = emu.stop() {
        warn!(%err, "停止仿真网络失败");
    }

    Ok(PerfReport {
        topology: topo.kind(),
        hosts: dumps,
        ping,
        bandwidth,
    })
}

/// 构建拓扑并跑完整的验证流程
pub fn perf_test<E: Emulator>(
    kind: TopologyKind,
    topo_opts: &TopoOpts,
    opts: &PerfOpts,
    emu: &mut E,
) -> Result<PerfReport, PerfError> {
    let topo = topo::build(kind, topo_opts)?;
    validate(&topo, opts, emu)
}
