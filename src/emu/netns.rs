//! 基于 Linux network namespace 的仿真驱动
//!
//! 节点 -> namespace；交换机 -> namespace 内的 Linux bridge `br0`；
//! 链路 -> veth 对，两端都用 tc 整形；主机 -> 10.0.0.0/8 地址 + 可选的 cgroup CPU 限额。

use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::cgroup::HostCgroup;
use super::cmd::Runner;
use super::namespace::Namespace;
use super::shaping::apply_profile;
use super::{EmuError, EmuHost, Emulator};
use crate::net::{NodeKind, Topology};

/// 交换机内的网桥名
pub const BRIDGE: &str = "br0";
/// 主机地址前缀长度
pub const HOST_PREFIX_LEN: u8 = 8;

/// 第 index 台主机（从 1 开始）的地址：10.x.y.z
pub fn host_ip(index: usize) -> Ipv4Addr {
    let i = index as u32 & 0x00ff_ffff;
    Ipv4Addr::new(10, (i >> 16) as u8, (i >> 8) as u8, i as u8)
}

/// 节点第 port 个接口的名字，例如 `h1-eth0`
pub fn iface_name(node: &str, port: usize) -> String {
    format!("{node}-eth{port}")
}

/// 拓扑是否含环（决定交换机是否需要开启 STP）
pub fn has_switch_cycle(topo: &Topology) -> bool {
    let switches = topo.switches().count();
    let switch_links = topo
        .links()
        .iter()
        .filter(|l| topo.node(l.a).is_switch() && topo.node(l.b).is_switch())
        .count();
    // 交换机子图连通，边数 >= 点数即有环
    switches > 0 && switch_links >= switches
}

/// 驱动选项
#[derive(Debug, Clone)]
pub struct NetnsOpts {
    /// namespace / cgroup 名字前缀
    pub prefix: String,
    pub sudo: bool,
    /// 是否按 CPU 份额给主机加 cgroup 限额
    pub cpu_limit: bool,
    /// 是否在每台主机上启动 `iperf -s`
    pub iperf_server: bool,
    /// 开启 STP 后等待端口进入 forwarding 的时间
    pub stp_settle: Duration,
}

impl Default for NetnsOpts {
    fn default() -> Self {
        Self {
            prefix: format!("tp{}", std::process::id()),
            sudo: true,
            cpu_limit: true,
            iperf_server: true,
            stp_settle: Duration::from_secs(35),
        }
    }
}

/// 一台已实例化的主机
#[derive(Debug)]
pub struct NetnsHost {
    name: String,
    ns: String,
    ip: Ipv4Addr,
    runner: Runner,
    cgroup: Option<HostCgroup>,
}

impl EmuHost for NetnsHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    fn cmd(&self, line: &str) -> Result<String, EmuError> {
        let prefix = self
            .cgroup
            .as_ref()
            .map(HostCgroup::enter_prefix)
            .unwrap_or_default();
        let script = format!("{prefix}{{ {line}\n}} 2>&1");
        let args = [
            "ip",
            "netns",
            "exec",
            self.ns.as_str(),
            "sh",
            "-c",
            script.as_str(),
        ];
        let output = self.runner.run(&args)?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(EmuError::Command {
                cmd: line.to_string(),
                status: output.status.to_string(),
                output: text,
            });
        }
        Ok(text)
    }
}

/// network namespace 仿真驱动
#[derive(Debug)]
pub struct NetnsEmulator {
    opts: NetnsOpts,
    runner: Runner,
    hosts: Vec<NetnsHost>,
    namespaces: Vec<Namespace>,
    running: bool,
}

impl NetnsEmulator {
    pub fn new(opts: NetnsOpts) -> Self {
        let runner = Runner { sudo: opts.sudo };
        Self {
            opts,
            runner,
            hosts: Vec::new(),
            namespaces: Vec::new(),
            running: false,
        }
    }

    fn ns_name(&self, label: &str) -> String {
        format!("{}-{}", self.opts.prefix, label)
    }

    fn create_nodes(&mut self, topo: &Topology, stp: bool) -> Result<(), EmuError> {
        for node in topo.nodes() {
            let ns = Namespace::new(self.ns_name(node.name()), self.runner)?;
            if node.kind == NodeKind::Switch {
                let stp_state = if stp { "1" } else { "0" };
                ns.exec_checked(
                    "ip",
                    &["link", "add", BRIDGE, "type", "bridge", "stp_state", stp_state],
                )?;
                ns.exec_checked("ip", &["link", "set", BRIDGE, "up"])?;
            }
            self.namespaces.push(ns);
        }
        Ok(())
    }

    fn create_links(&self, topo: &Topology) -> Result<(), EmuError> {
        let mut ports = vec![0usize; topo.nodes().len()];
        let mut host_ips = vec![None; topo.nodes().len()];
        for (idx, host) in topo.hosts().enumerate() {
            host_ips[host.id.0] = Some(host_ip(idx + 1));
        }

        for link in topo.links() {
            let (a, b) = (topo.node(link.a), topo.node(link.b));
            let a_if = iface_name(a.name(), ports[a.id.0]);
            let b_if = iface_name(b.name(), ports[b.id.0]);
            ports[a.id.0] += 1;
            ports[b.id.0] += 1;

            let a_ns = &self.namespaces[a.id.0];
            let b_ns = &self.namespaces[b.id.0];
            a_ns.exec_checked(
                "ip",
                &[
                    "link",
                    "add",
                    a_if.as_str(),
                    "type",
                    "veth",
                    "peer",
                    "name",
                    b_if.as_str(),
                    "netns",
                    b_ns.name(),
                ],
            )?;
            debug!(a = %a_if, b = %b_if, "创建 veth 对");

            for (node, ns, iface) in [(a, a_ns, a_if.as_str()), (b, b_ns, b_if.as_str())] {
                match host_ips[node.id.0] {
                    Some(ip) => {
                        let addr = format!("{ip}/{HOST_PREFIX_LEN}");
                        ns.exec_checked("ip", &["addr", "add", addr.as_str(), "dev", iface])?;
                    }
                    None => {
                        ns.exec_checked("ip", &["link", "set", iface, "master", BRIDGE])?;
                    }
                }
                ns.exec_checked("ip", &["link", "set", iface, "up"])?;
                apply_profile(ns, iface, &link.profile)?;
            }
        }
        Ok(())
    }

    fn create_hosts(&mut self, topo: &Topology) -> Result<(), EmuError> {
        for (idx, node) in topo.hosts().enumerate() {
            let ns = self.ns_name(node.name());
            let cgroup = match (self.opts.cpu_limit, node.cpu_share) {
                (true, Some(share)) => match HostCgroup::create(&ns, share, self.runner) {
                    Ok(cg) => Some(cg),
                    Err(err) => {
                        warn!(host = %node.name(), %err, "无法设置 CPU 限额，主机不受限运行");
                        None
                    }
                },
                _ => None,
            };
            let host = NetnsHost {
                name: node.name().to_string(),
                ns,
                ip: host_ip(idx + 1),
                runner: self.runner,
                cgroup,
            };
            if self.opts.iperf_server {
                host.cmd("iperf -s > /dev/null 2>&1 &")?;
            }
            self.hosts.push(host);
        }
        Ok(())
    }

    fn realize(&mut self, topo: &Topology, stp: bool) -> Result<(), EmuError> {
        self.create_nodes(topo, stp)?;
        self.create_links(topo)?;
        self.create_hosts(topo)
    }

    fn teardown(&mut self) {
        for ns in &self.namespaces {
            ns.kill_all();
        }
        // 先删 cgroup（此时已无进程），再删 namespace
        self.hosts.clear();
        self.namespaces.clear();
    }
}

impl Emulator for NetnsEmulator {
    type Host = NetnsHost;

    #[tracing::instrument(skip(self, topo), fields(kind = %topo.kind(), prefix = %self.opts.prefix))]
    fn start(&mut self, topo: &Topology) -> Result<(), EmuError> {
        if self.running {
            self.teardown();
        }
        let stp = has_switch_cycle(topo);
        if let Err(err) = self.realize(topo, stp) {
            self.teardown();
            return Err(err);
        }
        self.running = true;

        if stp {
            info!(settle = ?self.opts.stp_settle, "交换机间存在环路，等待 STP 收敛");
            thread::sleep(self.opts.stp_settle);
        }
        info!(
            hosts = self.hosts.len(),
            nodes = self.namespaces.len(),
            "🚀 仿真网络已启动"
        );
        Ok(())
    }

    fn hosts(&self) -> &[NetnsHost] {
        &self.hosts
    }

    fn stop(&mut self) -> Result<(), EmuError> {
        if !self.running {
            return Err(EmuError::NotStarted);
        }
        self.teardown();
        self.running = false;
        info!("仿真网络已停止");
        Ok(())
    }
}

impl Drop for NetnsEmulator {
    fn drop(&mut self) {
        if self.running {
            self.teardown();
        }
    }
}
