//! 全对连通性检查

use serde::Serialize;
use tracing::{info, warn};

use crate::emu::{EmuError, EmuHost};

/// 单次 ping 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PingProbe {
    pub src: String,
    pub dst: String,
    pub received: bool,
}

/// 全对 ping 的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PingSummary {
    pub sent: usize,
    pub received: usize,
    pub probes: Vec<PingProbe>,
}

impl PingSummary {
    pub fn dropped_percent(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        100.0 * (self.sent - self.received) as f64 / self.sent as f64
    }
}

/// 从 ping 输出中解析 "N received"
pub fn parse_received(output: &str) -> Option<u32> {
    output.lines().find_map(|line| {
        let (before, _) = line.split_once(" received")?;
        // busybox: "1 packets received"
        let before = before.trim_end_matches(" packets");
        before
            .rsplit(|c: char| c == ',' || c.is_whitespace())
            .find(|s| !s.is_empty())?
            .parse()
            .ok()
    })
}

pub fn ping_command<H: EmuHost>(dst: &H) -> String {
    format!("ping -c1 -W1 {}", dst.ip())
}

/// 对每个有序主机对 (src, dst) 依次 ping 一次
///
/// 失败只记录、不中断。
pub fn ping_all<H: EmuHost>(hosts: &[H]) -> PingSummary {
    let mut summary = PingSummary::default();
    for (i, src) in hosts.iter().enumerate() {
        let mut reached = Vec::new();
        for (j, dst) in hosts.iter().enumerate() {
            if i == j {
                continue;
            }
            let output = match src.cmd(&ping_command(dst)) {
                Ok(out) => out,
                Err(EmuError::Command { output, .. }) => output,
                Err(err) => {
                    warn!(src = %src.name(), dst = %dst.name(), %err, "ping 无法执行");
                    String::new()
                }
            };
            let received = parse_received(&output).is_some_and(|n| n > 0);
            summary.sent += 1;
            if received {
                summary.received += 1;
                reached.push(dst.name());
            }
            summary.probes.push(PingProbe {
                src: src.name().to_string(),
                dst: dst.name().to_string(),
                received,
            });
        }
        info!("{} -> {}", src.name(), reached.join(" "));
    }
    info!(
        "Results: {:.0}% dropped ({}/{} received)",
        summary.dropped_percent(),
        summary.received,
        summary.sent
    );
    summary
}
