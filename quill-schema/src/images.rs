//! Image upload rules.
//!
//! The file type is sniffed from the leading bytes with `image::guess_format`
//! (plus a markup check for SVG). The client's
//! filename and content type are ignored, so a text file renamed to
//! `cat.jpg` is still rejected.

use image::ImageFormat;
use quill_core::form::UploadedFile;

use crate::errors::SchemaErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Svg,
    Bmp,
    Webp,
}

impl ImageKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Svg => "image/svg+xml",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Extension used when storing the file.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Svg => "svg",
            ImageKind::Bmp => "bmp",
            ImageKind::Webp => "webp",
        }
    }

    /// Every extension name that refers to this kind in a `mimes` list.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ImageKind::Jpeg => &["jpeg", "jpg", "jpe"],
            ImageKind::Png => &["png"],
            ImageKind::Gif => &["gif"],
            ImageKind::Svg => &["svg"],
            ImageKind::Bmp => &["bmp"],
            ImageKind::Webp => &["webp"],
        }
    }

    /// Raster formats come from `image`'s signature table; SVG is text,
    /// so it is recognised by its root element instead.
    pub fn detect(bytes: &[u8]) -> Option<ImageKind> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Jpeg) => return Some(ImageKind::Jpeg),
            Ok(ImageFormat::Png) => return Some(ImageKind::Png),
            Ok(ImageFormat::Gif) => return Some(ImageKind::Gif),
            Ok(ImageFormat::Bmp) => return Some(ImageKind::Bmp),
            Ok(ImageFormat::WebP) => return Some(ImageKind::Webp),
            _ => {}
        }
        looks_like_svg(bytes).then_some(ImageKind::Svg)
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(4096)];
    let Ok(text) = std::str::from_utf8(head) else {
        // A multi-byte char may straddle the cut; fall back to lossy.
        let lossy = String::from_utf8_lossy(head).to_ascii_lowercase();
        return lossy.trim_start().starts_with('<') && lossy.contains("<svg");
    };
    let text = text.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    text.starts_with('<') && text.contains("<svg")
}

/// `image|mimes:...|max:...` as one rule set.
#[derive(Debug, Clone)]
pub struct ImageRules {
    /// Allowed extension names, in the order they are reported.
    pub mimes: Vec<String>,
    pub max_kilobytes: u64,
}

impl Default for ImageRules {
    fn default() -> Self {
        Self {
            mimes: ["jpeg", "png", "jpg", "gif", "svg"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_kilobytes: 2048,
        }
    }
}

impl ImageRules {
    pub fn with_max_kilobytes(mut self, max_kilobytes: u64) -> Self {
        self.max_kilobytes = max_kilobytes;
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_kilobytes.saturating_mul(1024)
    }

    fn accepts(&self, kind: ImageKind) -> bool {
        kind.aliases()
            .iter()
            .any(|alias| self.mimes.iter().any(|m| m.eq_ignore_ascii_case(alias)))
    }

    /// Check one upload. Pushes every failing rule for `field` into `errors`
    /// and returns the detected kind only when the file passed.
    pub fn check(
        &self,
        field: &str,
        file: Option<&UploadedFile>,
        required: bool,
        errors: &mut SchemaErrors,
    ) -> Option<ImageKind> {
        let Some(file) = file else {
            if required {
                errors.push_field(field, format!("The {field} field is required."));
            }
            return None;
        };

        if file.data.is_empty() {
            errors.push_field(field, format!("The {field} field is required."));
            return None;
        }

        let mut ok = true;
        let detected = ImageKind::detect(&file.data);
        match detected {
            None => {
                ok = false;
                errors.push_field(field, format!("The {field} field must be an image."));
                errors.push_field(
                    field,
                    format!("The {field} field must be a file of type: {}.", self.mimes.join(", ")),
                );
            }
            Some(kind) if !self.accepts(kind) => {
                ok = false;
                errors.push_field(
                    field,
                    format!("The {field} field must be a file of type: {}.", self.mimes.join(", ")),
                );
            }
            Some(_) => {}
        }

        if file.size() as u64 > self.max_bytes() {
            ok = false;
            errors.push_field(
                field,
                format!(
                    "The {field} field must not be greater than {} kilobytes.",
                    self.max_kilobytes
                ),
            );
        }

        if ok {
            detected
        } else {
            None
        }
    }
}
