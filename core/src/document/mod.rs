//! document
//! PDF side of the codec: layout rules, the cover page, assembly on the
//! encode path and image harvesting on the decode path.

pub mod assemble;
pub mod cover;
pub mod harvest;
pub mod layout;

pub use assemble::{assemble_document, AssembledDocument};
pub use cover::{BarcodeInfo, CategorySummary, CoverSummary};
pub use harvest::{harvest_images, HarvestedImage, Harvest};

/// Failures while writing or reading the PDF container.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("pdf: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("pdf write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("linking symbol: {0}")]
    Linking(String),

    #[error("layout: {0}")]
    Layout(String),

    #[error("cover page: {0}")]
    Cover(String),

    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("document has no pages")]
    NoPages,
}
