//! Tree 拓扑构建
//!
//! 按下标寻址的二叉树：交换机 i 的父节点是 i/2，交换机 i 挂主机 h{2i-1} 与 h{2i}。
//! 共 n 台交换机、2n 台主机、3n-1 条链路。

use super::{Footprint, TopoOpts};
use crate::net::{NodeId, Topology, TopologyBuilder};
use crate::topo::TopologyKind;

pub fn build_tree(n: usize, size: Footprint, opts: &TopoOpts) -> Topology {
    let share = opts.cpu_share.share(n);
    let mut b = TopologyBuilder::with_capacity(size.nodes, size.links);

    // switches[i] 是交换机 s{i}；下标 0 不用
    let mut switches: Vec<NodeId> = Vec::with_capacity(n + 1);

    // 根交换机没有父链路，先挂上 h1/h2
    let root = b.add_switch("s1");
    switches.extend([root, root]);
    let h1 = b.add_host("h1", share);
    b.connect(root, h1, opts.link);
    let h2 = b.add_host("h2", share);
    b.connect(root, h2, opts.link);

    for i in 2..=n {
        let parent = switches[i / 2];
        let switch = b.add_switch(format!("s{i}"));
        switches.push(switch);

        let left = b.add_host(format!("h{}", 2 * i - 1), share);
        b.connect(switch, left, opts.link);
        let right = b.add_host(format!("h{}", 2 * i), share);
        b.connect(switch, right, opts.link);
        b.connect(switch, parent, opts.link);
    }

    b.finish(TopologyKind::Tree(n))
}
