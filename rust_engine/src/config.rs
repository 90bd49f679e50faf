//! 引擎全局配置
//!
//! 只提供新建控制器时使用的默认值，控制器自身的运行状态（防重入标志等）
//! 永远挂在各自实例上，不放在这里。

use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::path::{CurveKind, DomainPolicy};

/// 引擎配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct MotionConfig {
    // ========== 路径 ==========
    /// 每个区段的采样步数，默认 12
    /// 越大 → 弧长越精确，但重建越慢
    pub path_resolution: usize,
    /// 新路径默认曲线类型，默认 Smooth
    pub default_curve_kind: CurveKind,
    /// 新路径默认是否闭合，默认 false
    pub default_closed: bool,

    // ========== 偏移 ==========
    /// 偏移量越界处理策略，默认 Clamp
    pub default_domain_policy: DomainPolicy,

    // ========== 数值 ==========
    /// 小于此长度视为零长度（重合锚点 / 退化路径）
    pub zero_length_epsilon: f32,
    /// 锚点世界坐标变化超过此距离才触发路径重建
    pub rebuild_tolerance: f32,

    // ========== 调试 ==========
    /// 是否输出每次更新的调试日志，默认 false
    pub debug_log: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            // ====== 路径 ======
            // 与曲线默认分辨率一致，锚点刚好落在每第 12 个采样点上
            path_resolution: 12,
            default_curve_kind: CurveKind::Smooth,
            default_closed: false,

            // ====== 偏移 ======
            default_domain_policy: DomainPolicy::Clamp,

            // ====== 数值 ======
            zero_length_epsilon: 1e-6,
            rebuild_tolerance: 1e-5,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

/// 全局配置实例
static MOTION_CONFIG: Lazy<RwLock<MotionConfig>> = Lazy::new(|| RwLock::new(MotionConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> MotionConfig {
    MOTION_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: MotionConfig) {
    *MOTION_CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(MotionConfig::default());
}
