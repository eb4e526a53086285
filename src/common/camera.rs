//! ターンテーブル型カメラ（z 軸が上）

use super::constants::{
    CAMERA_AZIMUTH_DEG, CAMERA_DISTANCE, CAMERA_ELEVATION_DEG, CAMERA_FOV_DEG,
};
use glam::{Mat4, Vec3};

const NEAR: f32 = 0.01;
const FAR: f32 = 10_000.0;

/// 注視点のまわりを方位角・仰角で回るカメラ
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurntableCamera {
    pub fov_deg: f32,
    pub azimuth_deg: f32,
    pub elevation_deg: f32,
    pub distance: f32,
    pub center: Vec3,
}

/// スクリーン上に投影された点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    /// カメラからの奥行き（大きいほど遠い）
    pub depth: f32,
}

impl Default for TurntableCamera {
    fn default() -> Self {
        Self {
            fov_deg: CAMERA_FOV_DEG,
            azimuth_deg: CAMERA_AZIMUTH_DEG,
            elevation_deg: CAMERA_ELEVATION_DEG,
            distance: CAMERA_DISTANCE,
            center: Vec3::ZERO,
        }
    }
}

impl TurntableCamera {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// カメラ位置
    pub fn eye(&self) -> Vec3 {
        let az = self.azimuth_deg.to_radians();
        let el = self.elevation_deg.to_radians();
        let dir = Vec3::new(el.cos() * az.sin(), -el.cos() * az.cos(), el.sin());
        self.center + dir * self.distance
    }

    /// ビュー・射影行列
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.center, Vec3::Z);
        let proj = Mat4::perspective_rh(self.fov_deg.to_radians(), aspect.max(1e-6), NEAR, FAR);
        proj * view
    }

    /// ワールド座標をピクセル座標へ（カメラの背後なら None）
    pub fn project(&self, view_proj: &Mat4, p: Vec3, width: usize, height: usize) -> Option<Projected> {
        let clip = *view_proj * p.extend(1.0);
        if clip.w <= NEAR {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Projected {
            x: (ndc.x * 0.5 + 0.5) * width as f32,
            y: (1.0 - (ndc.y * 0.5 + 0.5)) * height as f32,
            depth: clip.w,
        })
    }

    /// 回転（仰角は真上・真下の手前で止める）
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.azimuth_deg = (self.azimuth_deg + d_azimuth).rem_euclid(360.0);
        self.elevation_deg = (self.elevation_deg + d_elevation).clamp(-89.0, 89.0);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).max(NEAR * 10.0);
    }

    /// バウンディングボックス全体が画角に収まるよう注視点と距離を合わせる
    pub fn fit_bounds(&mut self, min: Vec3, max: Vec3) {
        self.center = (min + max) * 0.5;
        let radius = ((max - min).length() * 0.5).max(1e-3);
        let half_fov = (self.fov_deg.to_radians() * 0.5).max(1e-3);
        self.distance = radius / half_fov.sin() * 1.1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_screen_center() {
        let cam = TurntableCamera::default();
        let vp = cam.view_proj(4.0 / 3.0);
        let p = cam.project(&vp, cam.center, 800, 600).unwrap();
        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);
        assert!((p.depth - cam.distance).abs() < 1e-3);
    }

    #[test]
    fn test_point_behind_camera_is_culled() {
        let cam = TurntableCamera::default();
        let vp = cam.view_proj(1.0);
        let behind = cam.eye() + (cam.eye() - cam.center);
        assert!(cam.project(&vp, behind, 100, 100).is_none());
    }

    #[test]
    fn test_up_axis_points_up_on_screen() {
        let cam = TurntableCamera::default();
        let vp = cam.view_proj(1.0);
        let base = cam.project(&vp, Vec3::ZERO, 100, 100).unwrap();
        let top = cam.project(&vp, Vec3::Z, 100, 100).unwrap();
        assert!(top.y < base.y);
    }

    #[test]
    fn test_orbit_wraps_and_clamps() {
        let mut cam = TurntableCamera::default();
        cam.orbit(350.0, 100.0);
        assert!((cam.azimuth_deg - 20.0).abs() < 1e-3);
        assert_eq!(cam.elevation_deg, 89.0);

        cam.reset();
        assert_eq!(cam, TurntableCamera::default());
    }

    #[test]
    fn test_fit_bounds_keeps_box_in_view() {
        let mut cam = TurntableCamera::default();
        let (lo, hi) = (Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 2.0, 40.0));
        cam.fit_bounds(lo, hi);
        assert_eq!(cam.center, Vec3::new(0.0, 1.0, 20.0));

        let vp = cam.view_proj(1.0);
        for corner in [lo, hi, Vec3::new(lo.x, hi.y, hi.z), Vec3::new(hi.x, lo.y, lo.z)] {
            let p = cam.project(&vp, corner, 200, 200).unwrap();
            assert!((0.0..=200.0).contains(&p.x), "{p:?}");
            assert!((0.0..=200.0).contains(&p.y), "{p:?}");
        }
    }
}
