//! Mesh 拓扑构建
//!
//! 先建好全部 h{i} <-> s{i}，再为每个无序对 i<j 连 s{i} <-> s{j}。
//! 交换机间链路数为 n(n-1)/2，构建前先按上限检查。

use super::{Footprint, TopoError, TopoOpts};
use crate::net::{Topology, TopologyBuilder};
use crate::topo::TopologyKind;
use tracing::debug;

/// n 台交换机全互联所需的链路数；溢出时返回 None
pub fn mesh_link_count(n: usize) -> Option<usize> {
    n.checked_mul(n.saturating_sub(1)).map(|x| x / 2)
}

pub fn build_mesh(n: usize, size: Footprint, opts: &TopoOpts) -> Result<Topology, TopoError> {
    let links = mesh_link_count(n).unwrap_or(usize::MAX);
    if links > opts.max_mesh_links {
        return Err(TopoError::ResourceExhaustion {
            n,
            links,
            max: opts.max_mesh_links,
        });
    }
    debug!(n, mesh_links = links, "构建 mesh 拓扑");

    let share = opts.cpu_share.share(n);
    let mut b = TopologyBuilder::with_capacity(size.nodes, size.links);

    let mut switches = Vec::with_capacity(n);
    for i in 1..=n {
        let host = b.add_host(format!("h{i}"), share);
        let switch = b.add_switch(format!("s{i}"));
        b.connect(host, switch, opts.link);
        switches.push(switch);
    }

    for i in 0..n {
        for j in (i + 1)..n {
            b.connect(switches[i], switches[j], opts.link);
        }
    }

    Ok(b.finish(TopologyKind::Mesh(n)))
}
