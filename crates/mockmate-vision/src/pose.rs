//! Head pose estimation from 3D-2D landmark correspondences.
//!
//! The pose pipeline mirrors the classic PnP (Perspective-n-Point) setup:
//! a pinhole camera model built from the frame dimensions, an iterative
//! Levenberg-Marquardt refinement that minimizes reprojection error, and a
//! rotation-vector to Euler-angle conversion for the direction classifier.

use nalgebra::{Matrix6, Point2, Point3, Rotation3, Vector3, Vector6};

use crate::error::{VisionError, VisionResult};

/// Minimum correspondences required for a pose solve.
const MIN_POSE_POINTS: usize = 4;

/// Pinhole camera model derived from the frame dimensions.
///
/// Focal length is approximated by the frame width; the principal point
/// sits at the frame center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    pub focal_length: f64,
    pub principal_x: f64,
    pub principal_y: f64,
}

impl CameraIntrinsics {
    /// Build intrinsics for a frame of the given pixel dimensions.
    pub fn from_frame(width: u32, height: u32) -> Self {
        Self {
            focal_length: width as f64,
            principal_x: width as f64 / 2.0,
            principal_y: height as f64 / 2.0,
        }
    }

    /// Project a camera-space point onto the image plane.
    fn project(&self, point: &Vector3<f64>) -> (f64, f64) {
        let u = self.focal_length * point.x / point.z + self.principal_x;
        let v = self.focal_length * point.y / point.z + self.principal_y;
        (u, v)
    }
}

/// Head orientation as Euler angles in degrees.
///
/// Camera-frame convention: `pitch` rotates about the image x-axis
/// (positive looks up), `yaw` about the y-axis (positive looks right),
/// `roll` about the optical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// Convert a scaled-axis rotation vector to Euler angles in degrees.
pub fn euler_from_rotation_vector(rotation_vector: &Vector3<f64>) -> EulerAngles {
    let rotation = Rotation3::from_scaled_axis(*rotation_vector);
    let (x_rot, y_rot, z_rot) = rotation.euler_angles();
    EulerAngles {
        pitch: x_rot.to_degrees(),
        yaw: y_rot.to_degrees(),
        roll: z_rot.to_degrees(),
    }
}

/// Solves for head rotation from landmark correspondences.
///
/// Seam for tests: session processing accepts any solver, so scenarios can
/// pin the head orientation without running the numeric refinement.
pub trait PoseSolver: Send + Sync {
    /// Solve for the rotation vector (scaled-axis form) that maps the
    /// object points onto the observed image points.
    fn solve(
        &self,
        object_points: &[Point3<f64>],
        image_points: &[Point2<f64>],
        intrinsics: &CameraIntrinsics,
    ) -> VisionResult<Vector3<f64>>;
}

/// Iterative PnP solver using Levenberg-Marquardt refinement.
///
/// Parameters are `[rx, ry, rz, tx, ty, tz]`. The Jacobian is estimated
/// with central differences; damping grows on rejected steps and shrinks
/// on accepted ones. The initial guess places the camera one focal length
/// in front of the principal point, which reprojects landmark-style
/// correspondences almost exactly and leaves only the rotation to refine.
#[derive(Debug, Clone)]
pub struct IterativePnpSolver {
    max_iterations: usize,
    tolerance: f64,
}

impl Default for IterativePnpSolver {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
        }
    }
}

impl IterativePnpSolver {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// Reprojection residuals, two per correspondence.
    fn residuals(
        params: &Vector6<f64>,
        object_points: &[Point3<f64>],
        image_points: &[Point2<f64>],
        intrinsics: &CameraIntrinsics,
    ) -> Vec<f64> {
        let rotation = Rotation3::from_scaled_axis(Vector3::new(params[0], params[1], params[2]));
        let translation = Vector3::new(params[3], params[4], params[5]);

        let mut residuals = Vec::with_capacity(object_points.len() * 2);
        for (object, image) in object_points.iter().zip(image_points) {
            let camera_space = rotation * *object + translation;
            let (u, v) = intrinsics.project(&camera_space.coords);
            residuals.push(u - image.x);
            residuals.push(v - image.y);
        }
        residuals
    }

    fn cost(residuals: &[f64]) -> f64 {
        residuals.iter().map(|r| r * r).sum()
    }
}

impl PoseSolver for IterativePnpSolver {
    fn solve(
        &self,
        object_points: &[Point3<f64>],
        image_points: &[Point2<f64>],
        intrinsics: &CameraIntrinsics,
    ) -> VisionResult<Vector3<f64>> {
        if object_points.len() != image_points.len() {
            return Err(VisionError::pose_solve_failed(format!(
                "point count mismatch: {} object vs {} image",
                object_points.len(),
                image_points.len()
            )));
        }
        if object_points.len() < MIN_POSE_POINTS {
            return Err(VisionError::pose_solve_failed(format!(
                "need at least {} correspondences, got {}",
                MIN_POSE_POINTS,
                object_points.len()
            )));
        }

        let mut params = Vector6::new(
            0.0,
            0.0,
            0.0,
            -intrinsics.principal_x,
            -intrinsics.principal_y,
            intrinsics.focal_length,
        );
        let mut residuals = Self::residuals(&params, object_points, image_points, intrinsics);
        let mut cost = Self::cost(&residuals);
        let mut lambda = 1e-3;

        for _ in 0..self.max_iterations {
            if cost <= self.tolerance {
                break;
            }

            // Central-difference Jacobian, one column per parameter.
            let mut columns: [Vec<f64>; 6] = Default::default();
            for (j, column) in columns.iter_mut().enumerate() {
                let step = 1e-6 * (1.0 + params[j].abs());

                let mut forward = params;
                forward[j] += step;
                let plus = Self::residuals(&forward, object_points, image_points, intrinsics);

                let mut backward = params;
                backward[j] -= step;
                let minus = Self::residuals(&backward, object_points, image_points, intrinsics);

                *column = plus
                    .iter()
                    .zip(&minus)
                    .map(|(p, m)| (p - m) / (2.0 * step))
                    .collect();
            }

            let mut jtj = Matrix6::<f64>::zeros();
            let mut jtr = Vector6::<f64>::zeros();
            for a in 0..6 {
                jtr[a] = columns[a]
                    .iter()
                    .zip(&residuals)
                    .map(|(j_val, r)| j_val * r)
                    .sum();
                for b in a..6 {
                    let value: f64 = columns[a]
                        .iter()
                        .zip(&columns[b])
                        .map(|(x, y)| x * y)
                        .sum();
                    jtj[(a, b)] = value;
                    jtj[(b, a)] = value;
                }
            }

            let damped = jtj + Matrix6::identity() * lambda;
            let delta = match damped.lu().solve(&(-jtr)) {
                Some(delta) => delta,
                None => {
                    lambda *= 10.0;
                    if lambda > 1e12 {
                        break;
                    }
                    continue;
                }
            };

            let candidate = params + delta;
            let candidate_residuals =
                Self::residuals(&candidate, object_points, image_points, intrinsics);
            let candidate_cost = Self::cost(&candidate_residuals);

            if candidate_cost.is_finite() && candidate_cost < cost {
                let improvement = cost - candidate_cost;
                params = candidate;
                residuals = candidate_residuals;
                cost = candidate_cost;
                lambda = (lambda * 0.1).max(1e-12);
                if improvement < self.tolerance * (1.0 + cost) {
                    break;
                }
            } else {
                lambda *= 10.0;
                if lambda > 1e12 {
                    break;
                }
            }
        }

        Ok(Vector3::new(params[0], params[1], params[2]))
    }
}
