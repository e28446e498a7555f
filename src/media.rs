//! Validation of images attached to tweets.

use crate::app_config::LimitsConfig;

/// An image as received from the upload form.
#[derive(Clone, Debug)]
pub struct UploadedImage {
    /// Client-side file name, used for the extension check
    pub filename: String,
    pub data: Vec<u8>,
    /// Optional crop rectangle, "x1,y1,x2,y2"
    pub cropping: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MediaError {
    InvalidExtension(String),
    TooLarge { filename: String, size: u64, max: u64 },
    InvalidCrop(String),
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::InvalidExtension(name) => {
                write!(f, "File type not allowed: {}", name)
            }
            MediaError::TooLarge {
                filename,
                size,
                max,
            } => write!(
                f,
                "Image {} is too large ({} bytes, max {} bytes)",
                filename, size, max
            ),
            MediaError::InvalidCrop(value) => write!(f, "Invalid crop box: {}", value),
        }
    }
}

impl std::error::Error for MediaError {}

/// Crop rectangle in source image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropBox {
    /// Parse "x1,y1,x2,y2". An empty string means no crop.
    pub fn parse(value: &str) -> Result<Option<Self>, MediaError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }

        let invalid = || MediaError::InvalidCrop(value.to_owned());
        let parts = value
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|_| invalid())?;

        match parts[..] {
            [x1, y1, x2, y2] if x2 >= x1 && y2 >= y1 => Ok(Some(Self { x1, y1, x2, y2 })),
            _ => Err(invalid()),
        }
    }

    pub fn to_field(&self) -> String {
        format!("{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Lowercased extension of `filename`, if any.
pub fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Check extension, size and crop box of one upload.
pub fn validate_image(image: &UploadedImage, limits: &LimitsConfig) -> Result<(), MediaError> {
    match extension(&image.filename) {
        Some(ext) if limits.image_extensions.iter().any(|e| *e == ext) => {}
        _ => return Err(MediaError::InvalidExtension(image.filename.clone())),
    }

    let size = image.data.len() as u64;
    let max = limits.max_image_size_bytes();
    if size > max {
        return Err(MediaError::TooLarge {
            filename: image.filename.clone(),
            size,
            max,
        });
    }

    if let Some(cropping) = &image.cropping {
        CropBox::parse(cropping)?;
    }

    Ok(())
}

/// Content-addressed storage key: blake3 hex digest plus extension.
pub fn storage_key(image: &UploadedImage) -> String {
    let hash = blake3::hash(&image.data).to_hex();
    match extension(&image.filename) {
        Some(ext) => format!("{}.{}", hash, ext),
        None => hash.to_string(),
    }
}
