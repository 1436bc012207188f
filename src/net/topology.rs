//! 拓扑描述
//!
//! `TopologyBuilder` 在构建期间累积节点和链路，`finish` 之后得到不可变的
//! `Topology`。描述本身不做任何 I/O，交给仿真驱动时只读借用。

use serde::Serialize;
use tracing::trace;

use super::id::{LinkId, NodeId};
use super::link::{ImpairmentProfile, Link};
use super::node::Node;
use crate::topo::TopologyKind;

/// 不可变的拓扑描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topology {
    kind: TopologyKind,
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Topology {
    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    /// 所有节点，按插入顺序
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// 主机，按插入顺序（也是验证阶段的探测顺序）
    pub fn hosts(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_host())
    }

    pub fn switches(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_switch())
    }

    /// 按标签查找节点
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// 与节点相连的链路
    pub fn links_of(&self, id: NodeId) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.touches(id))
            .map(|(idx, l)| (LinkId(idx), l))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.links_of(id).count()
    }

    /// 邻居节点，按链路创建顺序
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.links_of(id).filter_map(|(_, l)| l.other(id)).collect()
    }

    /// 以标签表示的链路端点，按创建顺序
    pub fn link_labels(&self) -> Vec<(&str, &str)> {
        self.links
            .iter()
            .map(|l| (self.node(l.a).name(), self.node(l.b).name()))
            .collect()
    }
}

/// 拓扑构建器
///
/// 只在 `topo` 的各个构建函数内部使用，构建完即被消费。
#[derive(Debug, Default)]
pub(crate) struct TopologyBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl TopologyBuilder {
    pub(crate) fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            links: Vec::with_capacity(links),
        }
    }

    /// 添加主机节点
    pub(crate) fn add_host(&mut self, name: impl Into<String>, cpu_share: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        let node = Node::host(id, name, cpu_share);
        trace!(name = %node.name, ?id, cpu_share, "添加主机");
        self.push_node(node);
        id
    }

    /// 添加交换机节点
    pub(crate) fn add_switch(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let node = Node::switch(id, name);
        trace!(name = %node.name, ?id, "添加交换机");
        self.push_node(node);
        id
    }

    /// 连接两个节点（创建一条无向链路）
    pub(crate) fn connect(&mut self, a: NodeId, b: NodeId, profile: ImpairmentProfile) -> LinkId {
        assert_ne!(a, b, "self-loop link on {a:?}");
        let id = LinkId(self.links.len());
        self.links.push(Link::new(a, b, profile));
        id
    }

    pub(crate) fn finish(self, kind: TopologyKind) -> Topology {
        Topology {
            kind,
            nodes: self.nodes,
            links: self.links,
        }
    }

    fn push_node(&mut self, node: Node) {
        debug_assert!(
            self.nodes.iter().all(|n| n.name != node.name),
            "duplicate node label {}",
            node.name
        );
        self.nodes.push(node);
    }
}
