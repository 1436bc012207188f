//! 标识符类型
//!
//! 定义节点和链路的唯一标识符。

use serde::{Deserialize, Serialize};

/// 节点标识符（按插入顺序分配的稠密下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// 链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub usize);
