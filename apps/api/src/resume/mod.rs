// Résumé intake: first-page rasterization and JPEG/base64 encoding.
// pdfium is synchronous, so rendering always runs on the blocking pool.

pub mod encoder;
pub mod rasterizer;
