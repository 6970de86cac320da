use crate::Failure;
use crate::Feature;
use std::path::Path;

/// Fixed-length numeric representation of one image.
pub type FeatureVector = Vec<Feature>;

/// Black-box image embedding model.
///
/// Loaded once per run and shared by every extraction. Implementations
/// must be deterministic for a fixed model and must report undecodable
/// images as [`Failure::UnreadableImage`].
pub trait Backbone: Send + Sync {
    /// Embeds one image.
    fn embed(&self, path: &Path) -> Result<FeatureVector, Failure>;
    /// Length of every vector this backbone returns.
    fn width(&self) -> usize;
}

impl Backbone for Box<dyn Backbone> {
    fn embed(&self, path: &Path) -> Result<FeatureVector, Failure> {
        (**self).embed(path)
    }
    fn width(&self) -> usize {
        (**self).width()
    }
}

/// Opens an image, reporting decode problems as unreadable.
pub fn decode(path: &Path) -> Result<image::DynamicImage, Failure> {
    image::ImageReader::open(path)
        .map_err(|e| Failure::UnreadableImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .with_guessed_format()
        .map_err(|e| Failure::UnreadableImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .decode()
        .map_err(|e| Failure::UnreadableImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Model-free backbone for dry runs and tests.
///
/// Decodes the image exactly like a real backbone would, then describes it
/// by its 8×8 RGB thumbnail, tiled out to the requested width. Visually
/// similar images land close together, which is all clustering needs.
#[derive(Debug, Clone, Copy)]
pub struct Synthetic {
    width: usize,
}

impl Synthetic {
    /// Side length of the descriptor thumbnail.
    const SIDE: u32 = 8;
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Backbone for Synthetic {
    fn embed(&self, path: &Path) -> Result<FeatureVector, Failure> {
        let thumb = decode(path)?
            .resize_exact(Self::SIDE, Self::SIDE, image::imageops::FilterType::Triangle)
            .to_rgb8()
            .into_raw();
        Ok((0..self.width)
            .map(|i| thumb[i % thumb.len()] as Feature / 255.)
            .collect())
    }
    fn width(&self) -> usize {
        self.width
    }
}

/// Loads the backbone the configuration asks for.
pub fn load(config: &crate::Config) -> Result<Box<dyn Backbone>, Failure> {
    if config.synthetic {
        log::warn!("using synthetic thumbnail backbone, embeddings are not {}", config.family);
        return Ok(Box::new(Synthetic::new(config.family.width())));
    }
    #[cfg(feature = "onnx")]
    {
        let onnx = super::Onnx::load(&config.weights(), config.family, config.device)?;
        return Ok(Box::new(onnx));
    }
    #[cfg(not(feature = "onnx"))]
    {
        Err(Failure::Backbone(
            "built without the `onnx` feature; rebuild with it or pass --synthetic".to_string(),
        ))
    }
}
