//! 拓扑构建错误

use thiserror::Error;

/// 拓扑构建阶段的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopoError {
    #[error("invalid topology kind: {0} (expected one of: single, linear, tree, mesh)")]
    InvalidTopologyKind(String),
    #[error("invalid size: {0} (expected a positive integer)")]
    InvalidSize(String),
    #[error("topology of size {n} needs {links} links, more than the limit of {max}")]
    ResourceExhaustion { n: usize, links: usize, max: usize },
}
