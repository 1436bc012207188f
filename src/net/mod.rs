//! 拓扑描述模块
//!
//! 此模块包含拓扑描述的数据模型：节点、链路、损伤参数以及不可变的拓扑描述。

// 子模块声明
mod id;
mod link;
mod node;
mod topology;

// 重新导出公共接口
pub use id::{LinkId, NodeId};
pub use link::{
    DEFAULT_BANDWIDTH_MBPS, DEFAULT_DELAY, DEFAULT_LOSS_PERCENT, DEFAULT_MAX_QUEUE_PKTS,
    ImpairmentProfile, Link, delay_str,
};
pub use node::{Node, NodeKind};
pub use topology::Topology;
pub(crate) use topology::TopologyBuilder;
