//! 拓扑构建模块
//!
//! 给定拓扑种类和规模 n，纯函数式地生成拓扑描述：节点集合、主机 CPU 份额、
//! 以及带损伤参数的链路集合。相同输入总是得到完全相同的描述。

pub mod error;
pub mod linear;
pub mod mesh;
pub mod single;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::net::{ImpairmentProfile, Topology};

pub use error::TopoError;

/// 默认 CPU 份额系数 k
pub const DEFAULT_CPU_SHARE_K: f64 = 0.5;
/// mesh 交换机间链路数上限（n = 100）
pub const DEFAULT_MAX_MESH_LINKS: usize = 4950;
/// 任意拓扑的总链路数上限
pub const DEFAULT_MAX_LINKS: usize = 100_000;

/// 拓扑种类，携带各自的规模参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "n", rename_all = "snake_case")]
pub enum TopologyKind {
    Single(usize),
    Linear(usize),
    Tree(usize),
    Mesh(usize),
}

/// 不带规模参数的种类名，用于解析
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindName {
    Single,
    Linear,
    Tree,
    Mesh,
}

impl KindName {
    pub const ALL: [KindName; 4] = [Self::Single, Self::Linear, Self::Tree, Self::Mesh];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Linear => "linear",
            Self::Tree => "tree",
            Self::Mesh => "mesh",
        }
    }

    pub fn with_size(self, n: usize) -> TopologyKind {
        match self {
            Self::Single => TopologyKind::Single(n),
            Self::Linear => TopologyKind::Linear(n),
            Self::Tree => TopologyKind::Tree(n),
            Self::Mesh => TopologyKind::Mesh(n),
        }
    }
}

impl FromStr for KindName {
    type Err = TopoError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| TopoError::InvalidTopologyKind(raw.to_string()))
    }
}

impl fmt::Display for KindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TopologyKind {
    /// 由命令行风格的参数解析：种类字符串 + 规模字符串
    pub fn parse(kind: &str, n: &str) -> Result<Self, TopoError> {
        let name: KindName = kind.parse()?;
        let n = parse_size(n)?;
        Ok(name.with_size(n))
    }

    /// 由种类字符串和整数规模构造；n <= 0 时报错
    pub fn from_parts(kind: &str, n: i64) -> Result<Self, TopoError> {
        let name: KindName = kind.parse()?;
        let n = usize::try_from(n)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| TopoError::InvalidSize(n.to_string()))?;
        Ok(name.with_size(n))
    }

    pub fn name(self) -> KindName {
        match self {
            Self::Single(_) => KindName::Single,
            Self::Linear(_) => KindName::Linear,
            Self::Tree(_) => KindName::Tree,
            Self::Mesh(_) => KindName::Mesh,
        }
    }

    pub fn n(self) -> usize {
        match self {
            Self::Single(n) | Self::Linear(n) | Self::Tree(n) | Self::Mesh(n) => n,
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.n())
    }
}

/// 解析规模参数：必须是正整数
pub fn parse_size(raw: &str) -> Result<usize, TopoError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| TopoError::InvalidSize(raw.to_string()))
}

/// 主机 CPU 份额的计算规则
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CpuShareRule {
    /// share = k / n
    PerHost { k: f64 },
    /// share = k * n
    Scaled { k: f64 },
    /// 与 n 无关的固定份额
    Fixed { share: f64 },
}

impl Default for CpuShareRule {
    fn default() -> Self {
        Self::PerHost {
            k: DEFAULT_CPU_SHARE_K,
        }
    }
}

impl CpuShareRule {
    pub fn share(self, n: usize) -> f64 {
        match self {
            Self::PerHost { k } => k / n.max(1) as f64,
            Self::Scaled { k } => k * n as f64,
            Self::Fixed { share } => share,
        }
    }
}

/// 拓扑构建选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopoOpts {
    /// 所有链路共用的损伤参数
    pub link: ImpairmentProfile,
    pub cpu_share: CpuShareRule,
    pub max_mesh_links: usize,
    /// 所有种类共用的总链路数上限，超出时构建前就报错
    pub max_links: usize,
}

impl Default for TopoOpts {
    fn default() -> Self {
        Self {
            link: ImpairmentProfile::default(),
            cpu_share: CpuShareRule::default(),
            max_mesh_links: DEFAULT_MAX_MESH_LINKS,
            max_links: DEFAULT_MAX_LINKS,
        }
    }
}

/// 拓扑规模：节点数与链路数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub nodes: usize,
    pub links: usize,
}

impl Footprint {
    /// 按种类计算规模；乘加溢出时返回 None
    pub fn of(kind: TopologyKind) -> Option<Self> {
        let n = kind.n();
        let (nodes, links) = match kind {
            TopologyKind::Single(_) => (single::SINGLE_HOSTS + 1, single::SINGLE_HOSTS),
            TopologyKind::Linear(_) => {
                let nodes = n.checked_mul(2)?;
                (nodes, nodes.saturating_sub(1))
            }
            TopologyKind::Tree(_) => {
                let nodes = n.checked_mul(3)?;
                (nodes, nodes.saturating_sub(1))
            }
            TopologyKind::Mesh(_) => (
                n.checked_mul(2)?,
                n.checked_add(mesh::mesh_link_count(n)?)?,
            ),
        };
        Some(Self { nodes, links })
    }
}

/// 构建拓扑描述
pub fn build(kind: TopologyKind, opts: &TopoOpts) -> Result<Topology, TopoError> {
    let n = kind.n();
    if n == 0 {
        return Err(TopoError::InvalidSize("0".to_string()));
    }
    // 先算规模再分配，超大 n 不会溢出或耗尽内存
    let footprint = match Footprint::of(kind) {
        Some(f) if f.links <= opts.max_links => f,
        other => {
            return Err(TopoError::ResourceExhaustion {
                n,
                links: other.map_or(usize::MAX, |f| f.links),
                max: opts.max_links,
            });
        }
    };
    let topo = match kind {
        TopologyKind::Single(n) => single::build_single(n, opts),
        TopologyKind::Linear(n) => linear::build_linear(n, footprint, opts),
        TopologyKind::Tree(n) => tree::build_tree(n, footprint, opts),
        TopologyKind::Mesh(n) => mesh::build_mesh(n, footprint, opts)?,
    };
    info!(
        kind = %kind,
        hosts = topo.hosts().count(),
        switches = topo.switches().count(),
        links = topo.links().len(),
        "🧱 拓扑构建完成"
    );
    Ok(topo)
}

/// 由字符串参数直接构建，等价于 `TopologyKind::parse` + `build`
pub fn build_from_args(kind: &str, n: &str, opts: &TopoOpts) -> Result<Topology, TopoError> {
    build(TopologyKind::parse(kind, n)?, opts)
}
