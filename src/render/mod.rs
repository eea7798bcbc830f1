//! Voucher PDF rendering pipeline: color/shape primitives, remote asset
//! loading, QR payload provisioning and the layout composer.

pub mod assets;
pub mod color;
pub mod composer;
pub mod pdf;
pub mod qr;
pub mod shapes;
pub mod template;

pub use assets::{AssetError, AssetFetcher, HttpAssetFetcher, ImageAsset};
pub use color::{ColorFormatError, Rgb, hex_to_rgb};
pub use composer::{BrandHeader, RenderError, render_voucher_document};
pub use template::Template;
