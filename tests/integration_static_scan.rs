//! Integration tests for still image scanning.
//!
//! These tests verify end-to-end behavior including:
//! - Scale ladder short-circuit and exhaustion
//! - EXIF orientation applied before recognition
//! - Real QR codes decoded and classified
//! - Input errors versus recognition misses

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use lumiscan::core::barcode::{BoundingBox, CoordinateSpace, RawDetection};
use lumiscan::core::cascade::ScaleLadder;
use lumiscan::core::classifier::ValueType;
use lumiscan::core::format::{BarcodeFormat, Symbology};
use lumiscan::core::imaging::ImageSource;
use lumiscan::core::pipeline::StaticScanner;
use lumiscan::core::recognizer::{QrRecognizer, Recognizer, Rotation};
use lumiscan::error::{ImageError, LumiscanError, RecognizeError};
use lumiscan::events::{Event, EventChannel, StaticScanEvent};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Finds a code only at one ladder position, recording every buffer size
struct HitAtStep {
    hit_on_call: usize,
    calls: AtomicUsize,
    sizes: Mutex<Vec<(u32, u32)>>,
}

impl HitAtStep {
    fn new(hit_on_call: usize) -> Self {
        Self {
            hit_on_call,
            calls: AtomicUsize::new(0),
            sizes: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Recognizer for HitAtStep {
    fn recognize(
        &self,
        image: &DynamicImage,
        _rotation: Rotation,
        _formats: BarcodeFormat,
    ) -> Result<Vec<RawDetection>, RecognizeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.sizes
            .lock()
            .unwrap()
            .push((image.width(), image.height()));

        if call == self.hit_on_call {
            // A box covering the middle half of whatever buffer we were given
            let (w, h) = (f64::from(image.width()), f64::from(image.height()));
            Ok(vec![RawDetection::new(
                Symbology::Qr,
                "WIFI:T:WPA;S:home;P:secret;;",
            )
            .with_bounding_box(BoundingBox {
                left: w / 4.0,
                top: h / 4.0,
                right: w * 3.0 / 4.0,
                bottom: h * 3.0 / 4.0,
            })])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Render `text` as a QR code with a four-module quiet zone
fn render_qr(text: &str, scale: u32) -> GrayImage {
    let code = QrCode::new(text.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let quiet = 4;
    let side = (modules + 2 * quiet) * scale;

    GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let inside = (quiet..quiet + modules).contains(&mx) && (quiet..quiet + modules).contains(&my);
        let dark = inside && colors[((my - quiet) * modules + (mx - quiet)) as usize] == Color::Dark;
        Luma([if dark { 0 } else { 255 }])
    })
}

/// Encode a JPEG carrying an EXIF orientation tag
fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    DynamicImage::ImageLuma8(GrayImage::new(width, height))
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();

    let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, 0x00, 0x01];
    tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0x00; 6]);

    let mut segment = b"Exif\0\0".to_vec();
    segment.extend_from_slice(&tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((segment.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn write_png(path: &Path, width: u32, height: u32) {
    let image = GrayImage::from_fn(width, height, |x, y| Luma([((x + y) % 256) as u8]));
    DynamicImage::ImageLuma8(image)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

#[test]
fn second_step_hit_invokes_recognizer_twice() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("poster.png");
    write_png(&path, 3000, 1500);

    let scanner = StaticScanner::builder(HitAtStep::new(2)).build();
    let barcodes = scanner.scan(&ImageSource::Path(path)).unwrap().unwrap();

    assert_eq!(scanner_calls(&scanner), 2);
    assert_eq!(barcodes.len(), 1);
    assert_eq!(barcodes[0].format(), BarcodeFormat::QR_CODE);
    match barcodes[0].value_type() {
        ValueType::Wifi(wifi) => {
            assert_eq!(wifi.ssid.as_deref(), Some("home"));
            assert_eq!(wifi.password.as_deref(), Some("secret"));
            assert_eq!(wifi.encryption_type.as_deref(), Some("WPA"));
        }
        other => panic!("expected wifi, got {:?}", other),
    }
}

#[test]
fn geometry_from_scaled_step_is_in_original_pixels() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("poster.png");
    write_png(&path, 3840, 2160);

    // First step scales 3840 -> 1920
    let scanner = StaticScanner::builder(HitAtStep::new(1)).build();
    let barcodes = scanner.scan(&ImageSource::Path(path)).unwrap().unwrap();

    let rect = barcodes[0].detection().bounding_box.unwrap();
    assert!((rect.left - 960.0).abs() < 1e-6);
    assert!((rect.top - 540.0).abs() < 1e-6);
    assert!((rect.right - 2880.0).abs() < 1e-6);
    assert!((rect.bottom - 1620.0).abs() < 1e-6);
}

#[test]
fn normalized_geometry_is_resolution_independent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("poster.png");
    write_png(&path, 3840, 2160);

    let scanner = StaticScanner::builder(HitAtStep::new(3))
        .coordinate_space(CoordinateSpace::Normalized)
        .build();
    let barcodes = scanner.scan(&ImageSource::Path(path)).unwrap().unwrap();

    let rect = barcodes[0].detection().bounding_box.unwrap();
    assert!((rect.left - 0.25).abs() < 1e-6);
    assert!((rect.bottom - 0.75).abs() < 1e-6);
}

#[test]
fn exhausted_ladder_is_none_after_four_attempts() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blank.png");
    write_png(&path, 640, 480);

    let scanner = StaticScanner::builder(HitAtStep::new(usize::MAX)).build();
    let (sender, receiver) = EventChannel::new();

    let result = scanner
        .scan_with_events(&ImageSource::Path(path), &sender)
        .unwrap();

    assert!(result.is_none());
    assert_eq!(scanner_calls(&scanner), 4);

    let attempted: Vec<Option<u32>> = receiver
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            Event::Static(StaticScanEvent::StepAttempted { target, .. }) => Some(target),
            _ => None,
        })
        .collect();
    assert_eq!(attempted, vec![Some(1920), Some(2560), Some(1280), None]);
}

#[test]
fn custom_ladder_controls_attempt_count() {
    let scanner = StaticScanner::builder(HitAtStep::new(usize::MAX))
        .ladder(ScaleLadder::new([Some(1024), None]))
        .build();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("small.png");
    write_png(&path, 32, 32);

    assert!(scanner.scan(&ImageSource::Path(path)).unwrap().is_none());
    assert_eq!(scanner_calls(&scanner), 2);
}

#[test]
fn missing_file_is_an_input_error() {
    let scanner = StaticScanner::builder(HitAtStep::new(1)).build();

    let result = scanner.scan(&ImageSource::Path("/nonexistent/ticket.png".into()));

    assert!(matches!(
        result,
        Err(LumiscanError::Image(ImageError::NotFound { .. }))
    ));
    assert_eq!(scanner_calls(&scanner), 0);
}

#[test]
fn corrupt_file_is_an_input_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corrupt.jpg");
    std::fs::write(&path, b"this is not a valid image file").unwrap();

    let scanner = StaticScanner::builder(HitAtStep::new(1)).build();
    let result = scanner.scan(&ImageSource::Path(path));

    assert!(matches!(
        result,
        Err(LumiscanError::Image(ImageError::Decode { .. }))
    ));
}

#[test]
fn qr_recognizer_finds_nothing_in_blank_image() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blank.png");
    write_png(&path, 200, 100);

    let scanner = StaticScanner::builder(QrRecognizer::new()).build();
    assert!(scanner.scan(&ImageSource::Path(path)).unwrap().is_none());
}

#[test]
fn exif_rotation_is_applied_before_recognition() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sideways.jpg");
    std::fs::write(&path, jpeg_with_orientation(40, 20, 6)).unwrap();

    let scanner = StaticScanner::builder(HitAtStep::new(usize::MAX)).build();
    assert!(scanner.scan(&ImageSource::Path(path)).unwrap().is_none());

    let sizes = scanner.recognizer().sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![(20, 40); 4]);
}

#[test]
fn exif_rotation_can_be_disabled() {
    let scanner = StaticScanner::builder(HitAtStep::new(usize::MAX))
        .apply_orientation(false)
        .build();

    scanner
        .scan(&ImageSource::Bytes(jpeg_with_orientation(40, 20, 6)))
        .unwrap();

    let sizes = scanner.recognizer().sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![(40, 20); 4]);
}

#[test]
fn qr_recognizer_decodes_wifi_code_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("router.png");
    DynamicImage::ImageLuma8(render_qr("WIFI:T:WPA;S:home;P:secret;;", 6))
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();

    let scanner = StaticScanner::builder(QrRecognizer::new()).build();
    let barcodes = scanner.scan(&ImageSource::Path(path)).unwrap().unwrap();

    assert_eq!(barcodes.len(), 1);
    assert_eq!(barcodes[0].format(), BarcodeFormat::QR_CODE);
    let payload = serde_json::to_value(barcodes[0].to_payload()).unwrap();
    assert_eq!(
        payload["valueType"],
        serde_json::json!({
            "type": 9,
            "data": {"ssid": "home", "password": "secret", "encryptionType": "WPA"}
        })
    );
    assert_eq!(barcodes[0].detection().corner_points.as_ref().map(Vec::len), Some(4));
}

fn scanner_calls(scanner: &StaticScanner<HitAtStep>) -> usize {
    scanner.recognizer().calls()
}
