use crate::geometry::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

/// 投影方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// 透视投影，垂直视场角（弧度）
    Perspective { fov_y: f32 },
    /// 正交投影，视口在观察空间中的高度
    Orthographic { height: f32 },
}

/// 相机类，负责管理视角和投影变换
#[derive(Debug, Clone)]
pub struct Camera {
    /// 相机位置（眼睛位置）
    pub position: Point3<f32>,
    /// 相机观察点（目标位置）
    pub target: Point3<f32>,
    /// 相机上方向
    pub up: Vector3<f32>,
    pub projection: Projection,
    /// 宽高比（视口宽度/高度）
    pub aspect_ratio: f32,
    /// 近裁剪平面距离
    pub near: f32,
    /// 远裁剪平面距离
    pub far: f32,
    view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
    view_projection_matrix: Matrix4<f32>,
}

impl Camera {
    /// 创建一个新的透视投影相机
    pub fn new_perspective(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov_y_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self::with_projection(
            position,
            target,
            up,
            Projection::Perspective {
                fov_y: fov_y_degrees.to_radians(),
            },
            aspect_ratio,
            near,
            far,
        )
    }

    /// 创建一个新的正交投影相机
    pub fn new_orthographic(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        height: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self::with_projection(
            position,
            target,
            up,
            Projection::Orthographic { height },
            aspect_ratio,
            near,
            far,
        )
    }

    fn with_projection(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        projection: Projection,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Camera {
            position,
            target,
            up: up.normalize(),
            projection,
            aspect_ratio,
            near,
            far,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
            view_projection_matrix: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }

    /// 更新所有相机矩阵
    pub fn update_matrices(&mut self) {
        self.view_matrix = TransformFactory::view(&self.position, &self.target, &self.up);

        self.projection_matrix = match self.projection {
            Projection::Perspective { fov_y } => {
                TransformFactory::perspective(self.aspect_ratio, fov_y, self.near, self.far)
            }
            Projection::Orthographic { height } => {
                let half_height = height / 2.0;
                let half_width = half_height * self.aspect_ratio;
                TransformFactory::orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        };

        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// 围绕目标点绕Y轴旋转相机
    pub fn orbit_y(&mut self, angle_degrees: f32) {
        let camera_to_target = self.position - self.target;
        let rotation = TransformFactory::rotation(&Vector3::y(), angle_degrees.to_radians());
        self.position = self.target + rotation.transform_vector(&camera_to_target);
        self.update_matrices();
    }

    /// 相机沿视线方向移动（正值接近目标，负值远离目标）
    pub fn dolly(&mut self, amount: f32) {
        let direction = (self.target - self.position).normalize();
        self.position += direction * amount;
        self.update_matrices();
    }

    /// 视口尺寸变化时更新宽高比
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.update_matrices();
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.view_projection_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::math::transform_point;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new_perspective(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            60.0,
            1.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = camera();
        let ndc = transform_point(&cam.view_projection_matrix(), &Vector3::zeros());
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn view_space_looks_down_negative_z() {
        let cam = camera();
        let view = transform_point(&cam.view_matrix(), &Vector3::zeros());
        assert_relative_eq!(view.z, -5.0, epsilon = 1e-5);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = camera();
        cam.orbit_y(90.0);
        assert_relative_eq!((cam.position - cam.target).norm(), 5.0, epsilon = 1e-4);
        assert_relative_eq!(cam.position.x, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn dolly_moves_along_view_direction() {
        let mut cam = camera();
        cam.dolly(2.0);
        assert_relative_eq!(cam.position.z, 3.0, epsilon = 1e-6);
        let view = transform_point(&cam.view_matrix(), &Vector3::zeros());
        assert_relative_eq!(view.z, -3.0, epsilon = 1e-5);
    }

    #[test]
    fn aspect_ratio_refreshes_projection() {
        let mut cam = camera();
        let before = cam.projection_matrix();
        cam.set_aspect_ratio(2.0);
        assert_relative_eq!(cam.projection_matrix()[(0, 0)], before[(0, 0)] / 2.0, epsilon = 1e-6);
        assert_relative_eq!(cam.projection_matrix()[(1, 1)], before[(1, 1)], epsilon = 1e-6);
    }

    #[test]
    fn orthographic_camera_is_not_perspective() {
        let cam = Camera::new_orthographic(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            2.0,
            1.0,
            0.1,
            100.0,
        );
        assert!(!cam.is_perspective());
        let p = transform_point(&cam.view_projection_matrix(), &Vector3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }
}
