//! Linear 拓扑构建
//!
//! 拓扑结构：s1 <-> s2 <-> ... <-> sN，每个交换机下挂一台主机 h{i}

use super::{Footprint, TopoOpts};
use crate::net::{NodeId, Topology, TopologyBuilder};
use crate::topo::TopologyKind;

pub fn build_linear(n: usize, size: Footprint, opts: &TopoOpts) -> Topology {
    let share = opts.cpu_share.share(n);
    let mut b = TopologyBuilder::with_capacity(size.nodes, size.links);

    let mut prev: Option<NodeId> = None;
    for i in 1..=n {
        let switch = b.add_switch(format!("s{i}"));
        let host = b.add_host(format!("h{i}"), share);
        b.connect(host, switch, opts.link);
        if let Some(prev) = prev {
            b.connect(prev, switch, opts.link);
        }
        prev = Some(switch);
    }

    b.finish(TopologyKind::Linear(n))
}
