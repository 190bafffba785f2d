//! MIME type detection module
//!
//! Returns the Content-Type for a picture based on its (lowercased) file extension.

/// Get MIME Content-Type based on file extension
///
/// Unknown or missing extensions fall back to `application/octet-stream`.
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Raster images
        Some("jpg" | "jpeg" | "jpe" | "jfif") => "image/jpeg",
        Some("png") => "image/png",
        Some("apng") => "image/apng",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("ico") => "image/x-icon",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",

        // Vector
        Some("svg") => "image/svg+xml",

        // Sidecar files that tend to live next to pictures
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",

        _ => "application/octet-stream",
    }
}
