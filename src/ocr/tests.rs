use super::*;
use crate::config::OcrConfig;

#[test]
fn supported_image_extensions() {
    assert!(is_supported_image(Path::new("scan.png")));
    assert!(is_supported_image(Path::new("photo.JPG")));
    assert!(is_supported_image(Path::new("fax.tiff")));
    assert!(is_supported_image(Path::new("dir/nested.jpeg")));

    assert!(!is_supported_image(Path::new("notes.txt")));
    assert!(!is_supported_image(Path::new("archive.pdf")));
    assert!(!is_supported_image(Path::new("no_extension")));
}

#[test]
fn engine_takes_settings_from_config() {
    let config = OcrConfig {
        binary: "my-tesseract".to_string(),
        language: "deu".to_string(),
        psm: 6,
        oem: 1,
    };
    let engine = TesseractOcr::new(&config);

    assert_eq!(engine.binary, "my-tesseract");
    assert_eq!(engine.language, "deu");
    assert_eq!(engine.psm, 6);
    assert_eq!(engine.oem, 1);
}

#[test]
fn missing_binary_is_an_ocr_error() {
    let config = OcrConfig {
        binary: "definitely-not-an-installed-binary".to_string(),
        ..OcrConfig::default()
    };
    let engine = TesseractOcr::new(&config);

    let err = engine
        .extract_text(Path::new("scan.png"))
        .expect_err("a missing binary should fail");
    assert!(matches!(err, crate::ScandexError::Ocr(_)));
}

#[cfg(unix)]
#[test]
fn successful_subprocess_output_is_trimmed() {
    // `echo` stands in for tesseract: it prints its arguments and
    // exits zero, exercising the success path end to end.
    let config = OcrConfig {
        binary: "echo".to_string(),
        ..OcrConfig::default()
    };
    let engine = TesseractOcr::new(&config);

    let text = engine
        .extract_text(Path::new("scan.png"))
        .expect("echo should succeed");
    assert!(text.starts_with("scan.png stdout"));
    assert!(!text.ends_with('\n'));
}
