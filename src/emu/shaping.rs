//! 链路整形
//!
//! 把 `ImpairmentProfile` 翻译成 `tc` 命令：根上挂 TBF 限速，子 qdisc 用 netem
//! 施加时延、丢包和队列上限。带宽为 0 时不限速，netem 直接作为根。

use super::EmuError;
use super::namespace::Namespace;
use crate::net::{ImpairmentProfile, delay_str};

/// TBF 的 burst（bytes）：速率的十分之一，至少 1540
pub fn tbf_burst_bytes(rate_kbit: u64) -> u64 {
    let rate_bytes_per_sec = rate_kbit.saturating_mul(1000) / 8;
    rate_bytes_per_sec.max(15_400) / 10
}

fn owned(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

/// netem 参数：delay / loss / limit
fn netem_args(profile: &ImpairmentProfile) -> Vec<String> {
    let mut args = Vec::new();
    if !profile.delay.is_zero() {
        args.push("delay".to_string());
        args.push(delay_str::format(profile.delay));
    }
    if profile.loss_percent > 0.0 {
        args.push("loss".to_string());
        args.push(format!("{}%", profile.loss_percent));
    }
    args.push("limit".to_string());
    args.push(profile.max_queue_pkts.to_string());
    args
}

/// 给一个接口整形所需的全部 `tc` 命令（不含开头的 `tc`）
pub fn tc_commands(iface: &str, profile: &ImpairmentProfile) -> Vec<Vec<String>> {
    let mut cmds = Vec::with_capacity(2);

    if profile.bandwidth_mbps > 0 {
        let rate_kbit = profile.bandwidth_mbps.saturating_mul(1000);
        let rate = format!("{rate_kbit}kbit");
        let burst = tbf_burst_bytes(rate_kbit).to_string();
        cmds.push(owned(&[
            "qdisc",
            "add",
            "dev",
            iface,
            "root",
            "handle",
            "1:",
            "tbf",
            "rate",
            rate.as_str(),
            "burst",
            burst.as_str(),
            "latency",
            "1s",
        ]));
        let mut netem = owned(&[
            "qdisc", "add", "dev", iface, "parent", "1:1", "handle", "10:", "netem",
        ]);
        netem.extend(netem_args(profile));
        cmds.push(netem);
    } else {
        let mut netem = owned(&["qdisc", "add", "dev", iface, "root", "handle", "10:", "netem"]);
        netem.extend(netem_args(profile));
        cmds.push(netem);
    }

    cmds
}

/// 在命名空间内对接口应用整形
pub fn apply_profile(
    ns: &Namespace,
    iface: &str,
    profile: &ImpairmentProfile,
) -> Result<(), EmuError> {
    for cmd in tc_commands(iface, profile) {
        let args: Vec<&str> = cmd.iter().map(String::as_str).collect();
        ns.exec_checked("tc", &args)?;
    }
    Ok(())
}
