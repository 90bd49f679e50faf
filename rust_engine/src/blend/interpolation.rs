//! 插值工具函数

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Quat, Vec3};

/// 线性插值，写成 `a*(1-t) + b*t` 保证 t=0 / t=1 时精确等于端点
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// 逐分量线性插值
#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// 矩阵逐分量线性插值
pub fn lerp_mat4(a: Mat4, b: Mat4, t: f32) -> Mat4 {
    let a = a.to_cols_array();
    let b = b.to_cols_array();
    let mut out = [0.0f32; 16];
    for (i, value) in out.iter_mut().enumerate() {
        *value = lerp_f32(a[i], b[i], t);
    }
    Mat4::from_cols_array(&out)
}

/// 球面插值（走最短弧），端点处精确返回输入
pub fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a.normalize().slerp(b.normalize(), t)
    }
}

/// 阶跃：t 到 1 之前一直取 from
#[inline]
pub fn step<T: Copy>(from: T, to: T, t: f32) -> T {
    if t >= 1.0 {
        to
    } else {
        from
    }
}

/// 整数帧之间的插值系数
pub fn coefficient(prev_frame: u32, next_frame: u32, frame: u32) -> f32 {
    let interval = next_frame.saturating_sub(prev_frame);
    if interval == 0 {
        return 1.0;
    }
    (frame.saturating_sub(prev_frame) as f32 / interval as f32).clamp(0.0, 1.0)
}

/// 把欧拉角调整到与上一帧连续（逐分量 ±2π，并考虑等价的翻转解）
pub fn compatible_euler(euler: Vec3, prev: Vec3) -> Vec3 {
    let unwrap = |angle: f32, reference: f32| angle + TAU * ((reference - angle) / TAU).round();
    let wrap_all = |e: Vec3| {
        Vec3::new(
            unwrap(e.x, prev.x),
            unwrap(e.y, prev.y),
            unwrap(e.z, prev.z),
        )
    };

    let direct = wrap_all(euler);
    let flipped = wrap_all(Vec3::new(euler.x + PI, PI - euler.y, euler.z + PI));

    if (flipped - prev).length_squared() < (direct - prev).length_squared() {
        flipped
    } else {
        direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::EulerRot;

    #[test]
    fn test_lerp_exact_endpoints() {
        assert_eq!(lerp_f32(0.1, 0.7, 0.0), 0.1);
        assert_eq!(lerp_f32(0.1, 0.7, 1.0), 0.7);
        assert_eq!(lerp_f32(2.0, 4.0, 0.5), 3.0);
        let a = Vec3::new(0.3, -1.7, 9.1);
        let b = Vec3::new(5.5, 0.2, -3.3);
        assert_eq!(lerp_vec3(a, b, 0.0), a);
        assert_eq!(lerp_vec3(a, b, 1.0), b);
    }

    #[test]
    fn test_lerp_mat4() {
        let a = Mat4::IDENTITY;
        let b = Mat4::from_scale(Vec3::splat(3.0));
        let mid = lerp_mat4(a, b, 0.5);
        assert_eq!(mid.x_axis.x, 2.0);
        assert_eq!(mid.w_axis.w, 1.0);
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quat::from_rotation_z(0.0);
        let b = Quat::from_rotation_z(1.0);
        assert_eq!(slerp(a, b, 0.0), a);
        assert_eq!(slerp(a, b, 1.0), b);
        let mid = slerp(a, b, 0.5);
        assert!(mid.dot(Quat::from_rotation_z(0.5)).abs() > 1.0 - 1e-6);
    }

    #[test]
    fn test_step() {
        assert!(!step(false, true, 0.3));
        assert!(!step(false, true, 0.999));
        assert!(step(false, true, 1.0));
    }

    #[test]
    fn test_coefficient() {
        assert_eq!(coefficient(10, 20, 15), 0.5);
        assert_eq!(coefficient(10, 10, 10), 1.0);
        assert_eq!(coefficient(10, 20, 30), 1.0);
    }

    #[test]
    fn test_compatible_euler_unwraps() {
        let prev = Vec3::new(0.0, 0.0, 3.1);
        let current = Vec3::new(0.0, 0.0, -3.1);
        let fixed = compatible_euler(current, prev);
        assert!((fixed.z - (TAU - 3.1)).abs() < 1e-4);
    }

    #[test]
    fn test_compatible_euler_same_rotation() {
        let prev = Vec3::new(0.2, 1.4, -0.3);
        let q = Quat::from_euler(EulerRot::XYZ, 0.25, 1.45, -0.35);
        let (x, y, z) = q.to_euler(EulerRot::XYZ);
        let fixed = compatible_euler(Vec3::new(x, y, z), prev);
        let back = Quat::from_euler(EulerRot::XYZ, fixed.x, fixed.y, fixed.z);
        assert!(back.dot(q).abs() > 1.0 - 1e-5);
        assert!((fixed - prev).length() < 0.5);
    }
}
