use crate::emu::{EmuError, EmuHost, Emulator, HostCgroup, NetnsEmulator, NetnsOpts, Runner};
use crate::net::ImpairmentProfile;
use crate::topo::{self, TopoOpts, TopologyKind};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tp-cg-{tag}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// 需要 `ip` 和免密 sudo
fn check_privileges() -> bool {
    let has_ip = Command::new("ip")
        .arg("netns")
        .output()
        .is_ok_and(|o| o.status.success());

    has_ip
        && Command::new("sudo")
            .args(["-n", "ip", "netns", "list"])
            .output()
            .is_ok_and(|o| o.status.success())
}

fn lossless_opts() -> TopoOpts {
    TopoOpts {
        link: ImpairmentProfile {
            loss_percent: 0.0,
            ..ImpairmentProfile::default()
        },
        ..TopoOpts::default()
    }
}

fn test_emulator(tag: &str) -> NetnsEmulator {
    NetnsEmulator::new(NetnsOpts {
        prefix: format!("tpt{}{tag}", std::process::id() % 0xffff),
        cpu_limit: false,
        iperf_server: false,
        stp_settle: Duration::ZERO,
        ..NetnsOpts::default()
    })
}

#[test]
fn stop_before_start_is_an_error() {
    let mut emu = test_emulator("s");
    assert!(matches!(emu.stop(), Err(EmuError::NotStarted)));
    assert!(emu.hosts().is_empty());
}

#[test]
fn cgroup_drop_removes_empty_dir() {
    let dir = unique_temp_dir("empty");
    let cg = HostCgroup::attach(dir.clone(), Runner { sudo: false });
    drop(cg);
    assert!(!dir.exists());
}

#[test]
fn cgroup_removal_failure_is_reported_not_fatal() {
    // 目录非空时 rmdir 失败，与 cgroup 内仍有进程时的 EBUSY 一样
    let dir = unique_temp_dir("busy");
    fs::write(dir.join("cgroup.procs"), "1\n").expect("write procs");

    let cg = HostCgroup::attach(dir.clone(), Runner { sudo: false });
    assert!(matches!(cg.remove(), Err(EmuError::Command { .. })));
    drop(cg);
    assert!(dir.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn linear_topology_is_reachable_end_to_end() {
    if !check_privileges() {
        eprintln!("Skipping: insufficient privileges");
        return;
    }

    let topo = topo::build(TopologyKind::Linear(2), &lossless_opts()).expect("build");
    let mut emu = test_emulator("l");
    if let Err(err) = emu.start(&topo) {
        if err.to_string().contains("qdisc kind is unknown") {
            eprintln!("Skipping: netem not available");
            return;
        }
        panic!("start: {err}");
    }

    let hosts = emu.hosts();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0].name(), "h1");
    assert_eq!(hosts[1].ip().to_string(), "10.0.0.2");

    let out = hosts[0]
        .cmd(&format!("ping -c1 -W2 {}", hosts[1].ip()))
        .expect("ping h1 -> h2");
    assert!(out.contains(" 1 received"), "ping output: {out}");

    let qdisc = hosts[0].cmd("tc qdisc show dev h1-eth0").expect("tc show");
    assert!(qdisc.contains("netem"), "qdisc: {qdisc}");

    emu.stop().expect("stop");
    assert!(emu.hosts().is_empty());
}
