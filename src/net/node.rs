//! 节点类型
//!
//! 拓扑描述中的节点：主机或交换机。主机额外携带 CPU 份额。

use super::id::NodeId;
use serde::{Deserialize, Serialize};

/// 节点种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Host,
    Switch,
}

impl NodeKind {
    /// 标签前缀：主机 `h`，交换机 `s`
    pub fn prefix(self) -> char {
        match self {
            NodeKind::Host => 'h',
            NodeKind::Switch => 's',
        }
    }
}

/// 拓扑节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// 主机的 CPU 份额（占整机 CPU 的比例）；交换机为 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_share: Option<f64>,
}

impl Node {
    /// 创建主机节点
    pub fn host(id: NodeId, name: impl Into<String>, cpu_share: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Host,
            cpu_share: Some(cpu_share),
        }
    }

    /// 创建交换机节点
    pub fn switch(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Switch,
            cpu_share: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_host(&self) -> bool {
        self.kind == NodeKind::Host
    }

    pub fn is_switch(&self) -> bool {
        self.kind == NodeKind::Switch
    }
}
