//! Passport links and their QR codes.

use qrcode::QrCode;
use qrcode::types::Color;
use tracing::{debug, warn};

use crate::errors::Error;

/// Light modules around the code on every side.
pub const QR_MARGIN: usize = 1;

/// QR width on the recommendations screen.
pub const RECOMMENDATIONS_QR_WIDTH: u32 = 220;
/// QR width in the chat sidebar.
pub const SIDEBAR_QR_WIDTH: u32 = 160;

/// Canonical shareable URL for a session.
pub fn passport_url(origin: &str, session_id: &str) -> String {
    format!(
        "{}/passport/{}",
        origin.trim_end_matches('/'),
        urlencoding::encode(session_id)
    )
}

/// Encoded QR code, including its margin, scaled to a pixel width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrBitmap {
    size: usize,
    module_px: u32,
    dark: Vec<bool>,
}

impl QrBitmap {
    /// Modules per side, margin included.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn module_px(&self) -> u32 {
        self.module_px
    }

    /// Rendered width in pixels; never more than the requested width unless a
    /// single pixel per module already exceeds it.
    pub fn pixel_width(&self) -> u32 {
        self.size as u32 * self.module_px
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.dark[y * self.size + x]
    }

    /// Two module rows per text line using half-block characters.
    pub fn render_terminal(&self) -> String {
        let mut out = String::with_capacity((self.size + 1) * self.size.div_ceil(2));
        for y in (0..self.size).step_by(2) {
            for x in 0..self.size {
                let glyph = match (self.is_dark(x, y), self.is_dark(x, y + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    /// Plain PBM (P1) image at pixel scale.
    pub fn to_pbm(&self) -> String {
        let width = self.pixel_width() as usize;
        let scale = self.module_px as usize;
        let mut out = format!("P1\n{width} {width}\n");
        for py in 0..width {
            let row: Vec<&str> = (0..width)
                .map(|px| if self.is_dark(px / scale, py / scale) { "1" } else { "0" })
                .collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }
}

/// Encode `data` with a one-module margin, scaled to fit `width_px`.
pub fn encode_qr(data: &str, width_px: u32) -> Result<QrBitmap, Error> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| Error::Qr(e.to_string()))?;
    let modules = code.width();
    let size = modules + 2 * QR_MARGIN;

    let mut dark = vec![false; size * size];
    for (i, color) in code.to_colors().into_iter().enumerate() {
        let (x, y) = (i % modules + QR_MARGIN, i / modules + QR_MARGIN);
        dark[y * size + x] = color == Color::Dark;
    }

    let module_px = (width_px / size as u32).max(1);
    Ok(QrBitmap {
        size,
        module_px,
        dark,
    })
}

/// QR for the active session, regenerated only when the session changes.
#[derive(Debug, Clone)]
pub struct PassportQr {
    origin: String,
    width_px: u32,
    cached: Option<(String, QrBitmap)>,
}

impl PassportQr {
    pub fn new(origin: impl Into<String>, width_px: u32) -> Self {
        Self {
            origin: origin.into(),
            width_px,
            cached: None,
        }
    }

    pub fn url_for(&self, session_id: &str) -> String {
        passport_url(&self.origin, session_id)
    }

    /// Bitmap for `session_id`. No session, or an encode failure, means no bitmap.
    pub fn for_session(&mut self, session_id: Option<&str>) -> Option<&QrBitmap> {
        let Some(session_id) = session_id else {
            self.cached = None;
            return None;
        };

        let fresh = !matches!(&self.cached, Some((id, _)) if id == session_id);
        if fresh {
            let url = self.url_for(session_id);
            self.cached = match encode_qr(&url, self.width_px) {
                Ok(bitmap) => {
                    debug!(%url, size = bitmap.size(), "encoded passport QR");
                    Some((session_id.to_string(), bitmap))
                }
                Err(e) => {
                    warn!(error = %e, "could not encode passport QR");
                    None
                }
            };
        }
        self.cached.as_ref().map(|(_, bitmap)| bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passport_url_trims_trailing_slash() {
        assert_eq!(
            passport_url("https://kiosk.example/", "abc123"),
            "https://kiosk.example/passport/abc123"
        );
        assert_eq!(
            passport_url("http://localhost:3000", "abc123"),
            "http://localhost:3000/passport/abc123"
        );
    }

    #[test]
    fn test_passport_url_encodes_session_id() {
        assert_eq!(
            passport_url("https://kiosk.example", "a b/c"),
            "https://kiosk.example/passport/a%20b%2Fc"
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode_qr("http://localhost:3000/passport/abc123", 240).unwrap();
        let b = encode_qr("http://localhost:3000/passport/abc123", 240).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_sessions_produce_different_bitmaps() {
        let a = encode_qr("http://localhost:3000/passport/abc123", 240).unwrap();
        let b = encode_qr("http://localhost:3000/passport/xyz789", 240).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_margin_is_one_light_module() {
        let bitmap = encode_qr("http://localhost:3000/passport/abc123", 240).unwrap();
        let last = bitmap.size() - 1;
        for i in 0..bitmap.size() {
            assert!(!bitmap.is_dark(i, 0));
            assert!(!bitmap.is_dark(0, i));
            assert!(!bitmap.is_dark(i, last));
            assert!(!bitmap.is_dark(last, i));
        }
        // Finder pattern corner sits just inside the margin.
        assert!(bitmap.is_dark(1, 1));
    }

    #[test]
    fn test_scaled_to_requested_width() {
        let bitmap = encode_qr("http://localhost:3000/passport/abc123", 240).unwrap();
        assert!(bitmap.pixel_width() <= 240);
        assert!(bitmap.module_px() >= 1);

        let small = encode_qr("http://localhost:3000/passport/abc123", SIDEBAR_QR_WIDTH).unwrap();
        assert!(small.module_px() <= bitmap.module_px());
    }

    #[test]
    fn test_pbm_header_and_rows() {
        let bitmap = encode_qr("abc", 64).unwrap();
        let pbm = bitmap.to_pbm();
        let width = bitmap.pixel_width();
        let mut lines = pbm.lines();
        assert_eq!(lines.next(), Some("P1"));
        assert_eq!(lines.next(), Some(format!("{width} {width}").as_str()));
        assert_eq!(lines.count(), width as usize);
    }

    #[test]
    fn test_terminal_render_uses_half_blocks() {
        let bitmap = encode_qr("abc", 64).unwrap();
        let text = bitmap.render_terminal();
        assert_eq!(text.lines().count(), bitmap.size().div_ceil(2));
        assert!(text.contains('█') || text.contains('▀'));
    }

    #[test]
    fn test_cache_regenerates_only_on_session_change() {
        let mut qr = PassportQr::new("http://localhost:3000", 240);
        assert!(qr.for_session(None).is_none());

        let first = qr.for_session(Some("abc123")).cloned().unwrap();
        let again = qr.for_session(Some("abc123")).cloned().unwrap();
        assert_eq!(first, again);

        let other = qr.for_session(Some("xyz789")).cloned().unwrap();
        assert_ne!(first, other);

        assert!(qr.for_session(None).is_none());
    }

    #[test]
    fn test_encode_failure_yields_no_bitmap() {
        let mut qr = PassportQr::new("http://localhost:3000", 240);
        let huge = "x".repeat(8000);
        assert!(matches!(encode_qr(&huge, 240), Err(Error::Qr(_))));
        assert!(qr.for_session(Some(&huge)).is_none());
    }
}
