//! 三次贝塞尔段与自动手柄

use glam::Vec3;

/// 自动手柄长度系数
const AUTO_HANDLE_SCALE: f32 = 2.5614;

/// 贝塞尔控制点（含左右手柄）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierKnot {
    pub co: Vec3,
    pub handle_left: Vec3,
    pub handle_right: Vec3,
}

impl BezierKnot {
    /// 手柄收缩到控制点本身（折线 / 自由端点）
    pub fn collapsed(co: Vec3) -> Self {
        Self {
            co,
            handle_left: co,
            handle_right: co,
        }
    }
}

/// 三次贝塞尔求值
pub fn cubic_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let s = 1.0 - t;
    let s2 = s * s;
    let t2 = t * t;
    p0 * (s2 * s) + p1 * (3.0 * s2 * t) + p2 * (3.0 * s * t2) + p3 * (t2 * t)
}

/// 计算穿过所有点的自动手柄
///
/// 手柄方向取前后两段单位方向之和，曲线在每个内部点上一阶导方向连续。
/// 首尾点手柄始终收缩到点本身。闭合路径只多出一段首尾相连的区段，
/// 手柄规则不变，所以这里不区分开放和闭合。
pub fn auto_handles(points: &[Vec3]) -> Vec<BezierKnot> {
    let count = points.len();
    let mut knots: Vec<BezierKnot> = points.iter().map(|p| BezierKnot::collapsed(*p)).collect();
    if count < 2 {
        return knots;
    }

    for i in 1..count - 1 {
        knots[i] = auto_knot(points[i - 1], points[i], points[i + 1]);
    }

    knots
}

fn auto_knot(prev: Vec3, co: Vec3, next: Vec3) -> BezierKnot {
    let dir_a = co - prev;
    let dir_b = next - co;
    let mut len_a = dir_a.length();
    let mut len_b = dir_b.length();

    // 与相邻点重合的一侧不贡献方向，手柄也收缩为零，重合段长度保持为 0
    let unit = |dir: Vec3, len: f32| if len > f32::EPSILON { dir / len } else { Vec3::ZERO };
    let tangent = unit(dir_a, len_a) + unit(dir_b, len_b);
    let len = tangent.length() * AUTO_HANDLE_SCALE;
    if len <= f32::EPSILON {
        return BezierKnot::collapsed(co);
    }

    // 两侧长度差距过大时限制较长一侧，防止手柄过冲
    if len_a > f32::EPSILON && len_b > f32::EPSILON {
        if len_a > 5.0 * len_b {
            len_a = 5.0 * len_b;
        }
        if len_b > 5.0 * len_a {
            len_b = 5.0 * len_a;
        }
    }

    BezierKnot {
        co,
        handle_left: co - tangent * (len_a / len),
        handle_right: co + tangent * (len_b / len),
    }
}
