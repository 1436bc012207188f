//! 全对带宽测试
//!
//! 带宽测量交给外部的 iperf；这里只负责按顺序发起并收集原始输出。

use serde::Serialize;
use tracing::{info, warn};

use crate::emu::EmuHost;

/// 一次 iperf 探测
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandwidthProbe {
    pub src: String,
    pub dst: String,
    /// iperf 的原始输出；失败时为 None
    pub output: Option<String>,
    pub error: Option<String>,
}

impl BandwidthProbe {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

pub fn iperf_command<H: EmuHost>(dst: &H, secs: u64) -> String {
    format!("iperf -c {} -t {secs} -i 1", dst.ip())
}

/// 对每个有序主机对 (src, dst) 依次跑一次 iperf
pub fn bandwidth_all<H: EmuHost>(hosts: &[H], secs: u64) -> Vec<BandwidthProbe> {
    let mut probes = Vec::with_capacity(hosts.len() * hosts.len().saturating_sub(1));
    for (i, src) in hosts.iter().enumerate() {
        for (j, dst) in hosts.iter().enumerate() {
            if i == j {
                continue;
            }
            info!(src = %src.name(), dst = %dst.name(), "iperf");
            let probe = match src.cmd(&iperf_command(dst, secs)) {
                Ok(output) => {
                    info!("{output}");
                    BandwidthProbe {
                        src: src.name().to_string(),
                        dst: dst.name().to_string(),
                        output: Some(output),
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(src = %src.name(), dst = %dst.name(), %err, "iperf 探测失败");
                    BandwidthProbe {
                        src: src.name().to_string(),
                        dst: dst.name().to_string(),
                        output: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            probes.push(probe);
        }
    }
    probes
}
