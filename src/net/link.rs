//! 链路类型
//!
//! 定义无向链路及其损伤参数（带宽、时延、丢包率、队列深度）。

use std::time::Duration;

use super::id::NodeId;
use serde::{Deserialize, Serialize};

/// 默认链路带宽（Mbit/s）
pub const DEFAULT_BANDWIDTH_MBPS: u64 = 10;
/// 默认单向时延
pub const DEFAULT_DELAY: Duration = Duration::from_millis(5);
/// 默认丢包率（百分比）
pub const DEFAULT_LOSS_PERCENT: f32 = 10.0;
/// 默认最大队列深度（packets）
pub const DEFAULT_MAX_QUEUE_PKTS: u32 = 1000;

/// 链路损伤参数
///
/// 所有拓扑的每条链路都使用同一份参数；默认值即标准配置
/// （10 Mbit/s、5ms、10% 丢包、1000 个包的队列）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpairmentProfile {
    pub bandwidth_mbps: u64,
    #[serde(with = "delay_str")]
    pub delay: Duration,
    pub loss_percent: f32,
    pub max_queue_pkts: u32,
}

impl Default for ImpairmentProfile {
    fn default() -> Self {
        Self {
            bandwidth_mbps: DEFAULT_BANDWIDTH_MBPS,
            delay: DEFAULT_DELAY,
            loss_percent: DEFAULT_LOSS_PERCENT,
            max_queue_pkts: DEFAULT_MAX_QUEUE_PKTS,
        }
    }
}

/// 无向链路
///
/// 端点顺序即创建顺序，只影响两端接口的编号。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
    pub profile: ImpairmentProfile,
}

impl Link {
    /// 创建新链路
    pub fn new(a: NodeId, b: NodeId, profile: ImpairmentProfile) -> Self {
        Self { a, b, profile }
    }

    /// 链路是否与节点相连
    pub fn touches(&self, id: NodeId) -> bool {
        self.a == id || self.b == id
    }

    /// 给定一端，返回另一端
    pub fn other(&self, id: NodeId) -> Option<NodeId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// 时延以 tc 风格的字符串表示（`5ms`、`250us`、`1s`）
pub mod delay_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn format(d: Duration) -> String {
        let us = d.as_micros();
        if us % 1_000_000 == 0 && us > 0 {
            format!("{}s", us / 1_000_000)
        } else if us % 1_000 == 0 {
            format!("{}ms", us / 1_000)
        } else {
            format!("{us}us")
        }
    }

    pub fn parse(raw: &str) -> Result<Duration, String> {
        let raw = raw.trim();
        let split = raw
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(raw.len());
        let (num, unit) = raw.split_at(split);
        let value: f64 = num
            .parse()
            .map_err(|_| format!("invalid delay value: {raw}"))?;
        let unit_nanos = match unit.trim() {
            "us" => 1_000.0,
            "ms" | "" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            other => return Err(format!("unknown delay unit '{other}' in {raw}")),
        };
        let nanos = (value * unit_nanos).round();
        if !nanos.is_finite() || nanos < 0.0 || nanos > u64::MAX as f64 {
            return Err(format!("invalid delay value: {raw}"));
        }
        Ok(Duration::from_nanos(nanos as u64))
    }

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(D::Error::custom)
    }
}
