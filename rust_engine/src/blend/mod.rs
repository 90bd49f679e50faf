//! 属性混合
//!
//! 按通道类型分派插值：朝向球面插值，标量线性插值，布尔 / 引用阶跃。
//! 混合本身是纯函数，结果由调用方写回受控相机。

mod attributes;
mod blender;
mod channel;
pub mod interpolation;

pub use attributes::{AnchorAttributes, BlendedAttributes};
pub use blender::{blend, blend_value};
pub use channel::{AttributeChannelSet, CustomChannel, DrivenTarget, IntrinsicsTarget};
