use super::*;
use crate::Failure;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;

/// ImageNet channel means the backbones were trained with.
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet channel standard deviations.
const STD: [f32; 3] = [0.229, 0.224, 0.225];
/// Square input resolution.
const SIDE: u32 = 224;

/// Pretrained residual network exported to ONNX, truncated at its pooling layer.
///
/// The session is created once and reused for every image. `Session::run`
/// takes `&mut self`, so it sits behind a mutex to keep `embed` shareable
/// across the extraction pool.
pub struct Onnx {
    session: Mutex<Session>,
    family: Family,
}

impl Onnx {
    pub fn load(path: &Path, family: Family, device: Device) -> Result<Self, Failure> {
        if !path.exists() {
            return Err(Failure::Backbone(format!("weights not found: {}", path.display())));
        }
        if device == Device::Accelerator {
            log::warn!("no accelerator execution provider compiled in, running {} on cpu", family);
        }
        let session = Session::builder()
            .map_err(|e: ort::Error| Failure::Backbone(e.to_string()))?
            .with_intra_threads(num_cpus::get())
            .map_err(|e: ort::Error| Failure::Backbone(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e: ort::Error| Failure::Backbone(format!("onnx load failed: {e}")))?;
        log::info!("{:<32}{:<32}", "loaded backbone", family);
        Ok(Self {
            session: Mutex::new(session),
            family,
        })
    }

    /// Decodes, resizes and normalizes into a 1×3×224×224 tensor.
    fn tensor(path: &Path) -> Result<ndarray::Array4<f32>, Failure> {
        let rgb = decode(path)?
            .resize_exact(SIDE, SIDE, image::imageops::FilterType::Triangle)
            .to_rgb8();
        let side = SIDE as usize;
        Ok(ndarray::Array4::from_shape_fn((1, 3, side, side), |(_, c, y, x)| {
            let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.;
            (value - MEAN[c]) / STD[c]
        }))
    }
}

impl Backbone for Onnx {
    fn embed(&self, path: &Path) -> Result<FeatureVector, Failure> {
        use ort::value::TensorRef;
        let input = Self::tensor(path)?;
        let tensor = TensorRef::from_array_view(&input)
            .map_err(|e| Failure::Backbone(e.to_string()))?;
        let mut session = self
            .session
            .lock()
            .map_err(|_| Failure::Backbone("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| Failure::Backbone(format!("onnx inference failed: {e}")))?;
        // pooled output is [1, width] or [1, width, 1, 1]
        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Failure::Backbone(format!("output extraction: {e}")))?;
        if data.len() != self.width() {
            return Err(Failure::Backbone(format!(
                "{} output has {} values, expected {}",
                self.family,
                data.len(),
                self.width()
            )));
        }
        Ok(data.to_vec())
    }
    fn width(&self) -> usize {
        self.family.width()
    }
}
