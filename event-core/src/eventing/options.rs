use super::discovery::DiscoveryScope;
use bon::Builder;
use serde::{Deserialize, Serialize};

/// 分发器配置（构造时读取，之后在分发器生命周期内固定）
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventOptions {
    /// 某个监听器失败时是否继续并视整体分发为成功
    #[builder(default = true)]
    pub continue_on_error: bool,
    /// 批量发现时扫描的范围
    #[builder(default = vec![DiscoveryScope::process()])]
    pub scopes_to_scan: Vec<DiscoveryScope>,
    /// 构造时是否执行批量发现注册
    #[builder(default = true)]
    pub auto_register: bool,
}

impl Default for EventOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            scopes_to_scan: vec![DiscoveryScope::process()],
            auto_register: true,
        }
    }
}
