//! 属性混合器

use super::interpolation::{lerp_f32, lerp_mat4, lerp_vec3, slerp, step};
use super::{AnchorAttributes, AttributeChannelSet, BlendedAttributes};
use crate::source::AttributeValue;
use crate::{MotionError, Result};

/// 在两个锚点之间按 t 混合所有启用的通道
///
/// - 旋转：四元数球面插值
/// - 焦距 / 光圈 / 对焦距离：线性插值，两侧都必须是相机，否则本次跳过
/// - 自定义通道：按值类型分派，任一侧解析失败或类型不一致只跳过该通道
pub fn blend(
    from: &AnchorAttributes,
    to: &AnchorAttributes,
    t: f32,
    channels: &AttributeChannelSet,
) -> BlendedAttributes {
    debug_assert!(t.is_finite(), "blend factor must be finite");
    debug_assert!(channels.validate().is_ok(), "channel set must be validated before blending");

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mut out = BlendedAttributes::default();

    if channels.rotation {
        out.rotation = Some(slerp(from.orientation, to.orientation, t));
    }

    match (&from.camera, &to.camera) {
        (Some(a), Some(b)) => {
            if channels.focal_length {
                out.focal_length = Some(lerp_f32(a.lens, b.lens, t));
            }
            if channels.f_stop {
                out.f_stop = Some(lerp_f32(a.f_stop, b.f_stop, t));
            }
            if channels.focus_distance {
                if let (Some(da), Some(db)) = (from.focus_distance(), to.focus_distance()) {
                    out.focus_distance = Some(lerp_f32(da, db, t));
                }
            }
        }
        _ => {
            log::debug!(
                "{} -> {} 不全是相机，跳过焦距/光圈/对焦",
                from.source,
                to.source
            );
        }
    }

    for channel in &channels.custom {
        let value = from
            .properties
            .resolve(&channel.path)
            .and_then(|a| to.properties.resolve(&channel.path).map(|b| (a, b)))
            .and_then(|(a, b)| blend_value(&channel.path, a, b, t));

        match value {
            Ok(value) => out.custom.push((channel.path.clone(), value)),
            Err(err) => {
                log::debug!("{}", err);
                out.skipped.push(channel.path.clone());
            }
        }
    }

    out
}

/// 按值类型混合单个属性
pub fn blend_value(
    path: &str,
    from: &AttributeValue,
    to: &AttributeValue,
    t: f32,
) -> Result<AttributeValue> {
    use AttributeValue::*;

    let value = match (*from, *to) {
        (Scalar(a), Scalar(b)) => Scalar(lerp_f32(a, b, t)),
        (Vector3(a), Vector3(b)) => Vector3(lerp_vec3(a, b, t)),
        (Matrix4(a), Matrix4(b)) => Matrix4(lerp_mat4(a, b, t)),
        (Orientation(a), Orientation(b)) => Orientation(slerp(a, b, t)),
        (Flag(a), Flag(b)) => Flag(step(a, b, t)),
        (Reference(a), Reference(b)) => Reference(step(a, b, t)),
        (a, b) => {
            return Err(MotionError::ChannelResolution {
                path: path.to_string(),
                reason: format!("type mismatch: {} vs {}", a.kind_name(), b.kind_name()),
            })
        }
    };

    Ok(value)
}
