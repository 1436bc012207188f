//! 拓扑生成 + 性能验证
//!
//! 按种类和规模生成拓扑，在 network namespace 中实例化，然后跑全对 ping 和 iperf。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use topo_perf::emu::{NetnsEmulator, NetnsOpts};
use topo_perf::perf::{self, DEFAULT_IPERF_SECS, PerfOpts};
use topo_perf::topo::{self, KindName, TopoOpts, TopologyKind};

#[derive(Debug, Parser)]
#[command(
    name = "topo_perf",
    about = "Build an emulated topology and run connectivity/bandwidth checks on it"
)]
struct Args {
    /// Topology kind: single, linear, tree or mesh
    topology_kind: String,

    /// Size parameter (positive integer)
    #[arg(allow_hyphen_values = true)]
    n: String,

    /// Print the topology as JSON and exit without emulating it
    #[arg(long)]
    dry_run: bool,

    /// JSON file with link profile / CPU share / mesh limit overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Duration of each iperf probe (seconds)
    #[arg(long, default_value_t = DEFAULT_IPERF_SECS)]
    iperf_secs: u64,

    /// Write the validation report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Do not apply cgroup CPU limits to hosts
    #[arg(long)]
    no_cpu_limit: bool,
}

fn usage() -> String {
    let kinds = KindName::ALL.map(KindName::as_str).join(", ");
    format!("Usage: topo_perf <topology_kind> <n>\nTopology kinds: {kinds}")
}

fn fail(msg: impl std::fmt::Display) -> ExitCode {
    eprintln!("error: {msg}");
    eprintln!("{}", usage());
    ExitCode::from(1)
}

fn load_opts(path: Option<&Path>) -> Result<TopoOpts, String> {
    let Some(path) = path else {
        return Ok(TopoOpts::default());
    };
    let raw = fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| format!("parse {}: {e}", path.display()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprint!("{err}");
            eprintln!("{}", usage());
            return ExitCode::from(1);
        }
    };

    let topo_opts = match load_opts(args.config.as_deref()) {
        Ok(opts) => opts,
        Err(err) => return fail(err),
    };
    let kind = match TopologyKind::parse(&args.topology_kind, &args.n) {
        Ok(kind) => kind,
        Err(err) => return fail(err),
    };
    let topology = match topo::build(kind, &topo_opts) {
        Ok(t) => t,
        Err(err) => return fail(err),
    };

    if args.dry_run {
        let json = serde_json::to_string_pretty(&topology).expect("serialize topology");
        println!("{json}");
        return ExitCode::SUCCESS;
    }

    let mut emu = NetnsEmulator::new(NetnsOpts {
        cpu_limit: !args.no_cpu_limit,
        ..NetnsOpts::default()
    });
    let perf_opts = PerfOpts {
        iperf_secs: args.iperf_secs,
        ..PerfOpts::default()
    };
    let report = match perf::validate(&topology, &perf_opts, &mut emu) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };

    println!(
        "done: {} hosts, ping dropped {:.0}% ({}/{}), iperf ok {}/{}",
        report.hosts.len(),
        report.ping.dropped_percent(),
        report.ping.received,
        report.ping.sent,
        report.bandwidth.iter().filter(|p| p.ok()).count(),
        report.bandwidth.len()
    );

    if let Some(path) = args.report_json {
        let json = serde_json::to_string_pretty(&report).expect("serialize report");
        if let Err(err) = fs::write(&path, json) {
            eprintln!("error: write {}: {err}", path.display());
            return ExitCode::from(1);
        }
        eprintln!("wrote report to {}", path.display());
    }

    ExitCode::SUCCESS
}
