//! Face mesh landmark detection.
//!
//! The MediaPipe face mesh model runs under ONNX Runtime behind the
//! `face-detection` feature. Builds without it get a disabled detector
//! that reports every frame as face-free, so the service still runs in
//! environments without the model or runtime.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbImage;
use tracing::warn;

use crate::error::VisionResult;
use crate::landmarks::LandmarkFrame;

/// Produces a landmark frame from decoded pixels, or `None` when no face
/// is present.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    async fn detect(&self, image: &RgbImage) -> VisionResult<Option<LandmarkFrame>>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;
}

/// Fallback detector for builds without the `face-detection` feature.
pub struct DisabledLandmarkDetector;

#[async_trait]
impl LandmarkDetector for DisabledLandmarkDetector {
    async fn detect(&self, _image: &RgbImage) -> VisionResult<Option<LandmarkFrame>> {
        static WARNED: std::sync::Once = std::sync::Once::new();
        WARNED.call_once(|| {
            warn!(
                "Landmark detection disabled: built without the face-detection feature. \
                 Every frame will report no face."
            );
        });
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Build the best detector available in this build.
///
/// Prefers the ONNX face mesh when the feature is compiled in and the
/// model file is present; anything else degrades to the disabled detector.
pub fn default_detector() -> Arc<dyn LandmarkDetector> {
    #[cfg(feature = "face-detection")]
    {
        match ort_mesh::OrtFaceMesh::new_default() {
            Ok(detector) => return Arc::new(detector),
            Err(e) => {
                warn!("Face mesh unavailable ({}); falling back to disabled detector", e);
            }
        }
    }
    Arc::new(DisabledLandmarkDetector)
}

#[cfg(feature = "face-detection")]
pub use ort_mesh::OrtFaceMesh;

#[cfg(feature = "face-detection")]
mod ort_mesh {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use image::{imageops, RgbImage};
    use ndarray::Array;
    use ort::session::builder::GraphOptimizationLevel;
    use ort::session::Session;
    use ort::value::{Tensor, Value};

    use crate::error::{VisionError, VisionResult};
    use crate::landmarks::{Landmark, LandmarkFrame, MESH_LANDMARK_COUNT};

    use super::LandmarkDetector;

    /// Model input is a square RGB crop of this size.
    const MESH_INPUT_SIZE: u32 = 192;

    /// Face presence score below which a frame counts as face-free.
    const FACE_PRESENCE_THRESHOLD: f32 = 0.5;

    /// ONNX Runtime wrapper for the iris-refined MediaPipe face mesh.
    pub struct OrtFaceMesh {
        session: Mutex<Session>,
    }

    impl OrtFaceMesh {
        /// Load the model from the default search locations.
        pub fn new_default() -> VisionResult<Self> {
            let model_path = find_default_model_path().ok_or_else(|| {
                VisionError::model_not_found(
                    "face_landmark_with_attention.onnx not found; place it under models/face_mesh/",
                )
            })?;
            Self::from_model_file(&model_path)
        }

        /// Load the model from an explicit path.
        pub fn from_model_file(model_path: &Path) -> VisionResult<Self> {
            if !model_path.exists() {
                return Err(VisionError::model_not_found(format!(
                    "{}",
                    model_path.display()
                )));
            }

            let model_bytes = std::fs::read(model_path)
                .map_err(|e| VisionError::detection_failed(format!("ORT read model file: {e}")))?;

            let session = Session::builder()
                .map_err(|e| VisionError::detection_failed(format!("ORT session builder: {e}")))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| VisionError::detection_failed(format!("ORT opt level: {e}")))?
                .commit_from_memory(model_bytes.as_slice())
                .map_err(|e| VisionError::detection_failed(format!("ORT load model: {e}")))?;

            Ok(Self {
                session: Mutex::new(session),
            })
        }

        /// Normalize the frame to the model's (1,3,192,192) [-1,1] input.
        fn preprocess(image: &RgbImage) -> VisionResult<Value> {
            let resized = imageops::resize(
                image,
                MESH_INPUT_SIZE,
                MESH_INPUT_SIZE,
                imageops::FilterType::Triangle,
            );

            let side = MESH_INPUT_SIZE as usize;
            let mut chw = Vec::with_capacity(3 * side * side);
            // HWC -> CHW with normalization to [-1, 1].
            for c in 0..3 {
                for y in 0..MESH_INPUT_SIZE {
                    for x in 0..MESH_INPUT_SIZE {
                        let v = resized.get_pixel(x, y)[c] as f32 / 255.0;
                        chw.push(v * 2.0 - 1.0);
                    }
                }
            }

            let shape = vec![1usize, 3, side, side];
            Tensor::from_array((shape, chw.into_boxed_slice()))
                .map(Value::from)
                .map_err(|e| VisionError::detection_failed(format!("ORT tensor: {e}")))
        }

        fn infer(&self, image: &RgbImage) -> VisionResult<Option<LandmarkFrame>> {
            let input = Self::preprocess(image)?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| VisionError::detection_failed("ORT session poisoned"))?;

            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| VisionError::detection_failed(format!("ORT run failed: {e}")))?;

            // Face presence head, when the export carries one.
            if let Some(conf) = outputs.get("conf") {
                let (_, conf_data) = conf
                    .try_extract_tensor::<f32>()
                    .map_err(|e| VisionError::detection_failed(format!("ORT extract conf: {e}")))?;
                if let Some(&logit) = conf_data.first() {
                    let score = 1.0 / (1.0 + (-logit).exp());
                    if score < FACE_PRESENCE_THRESHOLD {
                        return Ok(None);
                    }
                }
            }

            let output = outputs
                .get("output")
                .ok_or_else(|| VisionError::detection_failed("ORT returned no outputs"))?;

            let (shape, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| VisionError::detection_failed(format!("ORT extract: {e}")))?;

            // Accept [1,478,3] or [478,3].
            let (points, dims) = match shape.len() {
                3 if shape[0] == 1 => (shape[1] as usize, shape[2] as usize),
                2 => (shape[0] as usize, shape[1] as usize),
                _ => {
                    return Err(VisionError::detection_failed(format!(
                        "Unexpected face mesh output shape: {:?}",
                        shape
                    )))
                }
            };

            if dims < 3 || data.len() < points * dims {
                return Err(VisionError::detection_failed(
                    "Face mesh output missing Z channel",
                ));
            }
            if points < MESH_LANDMARK_COUNT {
                return Err(VisionError::detection_failed(format!(
                    "Model emits {} points; iris-refined mesh with {} required",
                    points, MESH_LANDMARK_COUNT
                )));
            }

            let grid = Array::from_shape_vec((points, dims), data.to_vec())
                .map_err(|e| VisionError::detection_failed(format!("Reshape output: {e}")))?;

            // Model coordinates are pixels within the 192x192 input.
            let scale = MESH_INPUT_SIZE as f64;
            let mut landmarks = Vec::with_capacity(MESH_LANDMARK_COUNT);
            for i in 0..MESH_LANDMARK_COUNT {
                landmarks.push(Landmark {
                    x: grid[[i, 0]] as f64 / scale,
                    y: grid[[i, 1]] as f64 / scale,
                    z: grid[[i, 2]] as f64 / scale,
                });
            }

            Ok(Some(LandmarkFrame::new(landmarks)))
        }
    }

    #[async_trait]
    impl LandmarkDetector for OrtFaceMesh {
        async fn detect(&self, image: &RgbImage) -> VisionResult<Option<LandmarkFrame>> {
            self.infer(image)
        }

        fn name(&self) -> &'static str {
            "ort-face-mesh"
        }
    }

    /// Search common locations for the face mesh model.
    fn find_default_model_path() -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &[
            "./models/face_mesh/face_landmark_with_attention.onnx",
            "/app/models/face_mesh/face_landmark_with_attention.onnx",
        ];

        for p in CANDIDATES {
            let path = Path::new(p);
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }
        None
    }
}
