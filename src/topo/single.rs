//! Single 拓扑构建
//!
//! 拓扑结构：h1, h2, h3 <-> s1（固定 3 台主机，n 只影响 CPU 份额）

use super::TopoOpts;
use crate::net::{Topology, TopologyBuilder};
use crate::topo::TopologyKind;

pub const SINGLE_HOSTS: usize = 3;

pub fn build_single(n: usize, opts: &TopoOpts) -> Topology {
    let share = opts.cpu_share.share(n);
    let mut b = TopologyBuilder::with_capacity(SINGLE_HOSTS + 1, SINGLE_HOSTS);

    let s1 = b.add_switch("s1");
    for i in 1..=SINGLE_HOSTS {
        let host = b.add_host(format!("h{i}"), share);
        b.connect(host, s1, opts.link);
    }

    b.finish(TopologyKind::Single(n))
}
