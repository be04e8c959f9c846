// Unit tests for domain models

use super::*;

#[test]
fn test_crop_rect_well_formed() {
    assert!(CropRect::new(0.0, 0.0, 10.0, 10.0).is_well_formed());
    assert!(CropRect::new(0.0, 0.0, 0.0, 0.0).is_well_formed());
    assert!(!CropRect::new(-1.0, 0.0, 10.0, 10.0).is_well_formed());
    assert!(!CropRect::new(0.0, f64::NAN, 10.0, 10.0).is_well_formed());
    assert!(!CropRect::new(0.0, 0.0, f64::INFINITY, 10.0).is_well_formed());
}

#[test]
fn test_crop_rect_has_area() {
    assert!(CropRect::new(5.0, 5.0, 1.0, 1.0).has_area());
    assert!(!CropRect::new(5.0, 5.0, 0.0, 1.0).has_area());
    assert!(!CropRect::new(5.0, 5.0, 1.0, 0.0).has_area());
}

#[test]
fn test_crop_rect_parse() {
    let rect = CropRect::parse("10, 20,100.5,50").unwrap();
    assert_eq!(rect, CropRect::new(10.0, 20.0, 100.5, 50.0));

    assert!(CropRect::parse("10,20,100").is_err());
    assert!(CropRect::parse("a,b,c,d").is_err());
    assert!(CropRect::parse("-5,0,10,10").is_err());
}

#[test]
fn test_container_dimensions_parse() {
    let dims = ContainerDimensions::parse("640x360").unwrap();
    assert_eq!(dims, ContainerDimensions::new(640.0, 360.0));
    assert_eq!(ContainerDimensions::parse("1280X720").unwrap().width, 1280.0);

    assert!(ContainerDimensions::parse("640").is_err());
    assert!(ContainerDimensions::parse("0x360").is_err());
    assert!(ContainerDimensions::parse("axb").is_err());
}

#[test]
fn test_container_default() {
    let dims = ContainerDimensions::default();
    assert_eq!(dims.width, 640.0);
    assert_eq!(dims.height, 360.0);
}

#[test]
fn test_native_crop_filter() {
    let crop = NativeCrop::new(30, 40, 300, 150);
    assert_eq!(crop.to_filter(), "crop=300:150:30:40");
}

#[test]
fn test_mime_type_for_name() {
    assert_eq!(mime_type_for_name("clip.MP4"), "video/mp4");
    assert_eq!(mime_type_for_name("clip.mov"), "video/quicktime");
    assert_eq!(mime_type_for_name("clip.mkv"), "video/x-matroska");
    assert_eq!(mime_type_for_name("notes.txt"), "application/octet-stream");
    assert_eq!(mime_type_for_name("noext"), "application/octet-stream");
}

#[test]
fn test_video_file_extension() {
    let file = VideoFile::new("Holiday.MOV", vec![1u8, 2, 3]);
    assert_eq!(file.extension(), "mov");
    assert_eq!(file.mime_type, "video/quicktime");
    assert_eq!(file.size(), 3);

    let bare = VideoFile::new("capture", Vec::<u8>::new());
    assert_eq!(bare.extension(), "mp4");
}

#[test]
fn test_cancel_flag_shared_between_clones() {
    let flag = CancelFlag::new();
    let handle = flag.clone();
    assert!(!flag.is_cancelled());

    handle.cancel();
    assert!(flag.is_cancelled());

    flag.reset();
    assert!(!handle.is_cancelled());
}

#[test]
fn test_quality_presets() {
    assert_eq!(QualityPreset::parse("Balanced").unwrap(), QualityPreset::Balanced);
    let err = QualityPreset::parse("lossless").unwrap_err();
    assert!(err.contains("Unknown quality preset 'lossless'"), "{}", err);
    assert!(err.contains("fastest, balanced, quality"));
    assert!(!err.starts_with("Invalid crop"));

    let fastest = QualityPreset::Fastest.encode_settings();
    assert_eq!(fastest.preset, "ultrafast");
    assert_eq!(fastest.crf, 23);

    let quality = QualityPreset::Quality.encode_settings();
    assert_eq!(quality.preset, "medium");
    assert_eq!(quality.crf, 15);
}

#[test]
fn test_default_encode_settings_favour_speed() {
    let settings = EncodeSettings::default();
    assert_eq!(settings.video_codec, "libx264");
    assert_eq!(settings.preset, "ultrafast");
    assert_eq!(settings.crf, 28);
}

#[test]
fn test_batch_report_summary() {
    let mut report = BatchReport::default();
    report.results.push(CroppedVideo {
        id: "a".into(),
        processed_video: Blob::mp4(vec![0u8; 4]),
    });
    report.skipped.push(SkippedJob {
        id: "b".into(),
        file_name: "b.mp4".into(),
        reason: "corrupt".into(),
    });

    assert!(report.contains("a"));
    assert!(!report.contains("b"));
    assert_eq!(report.summary(), "1 succeeded, 1 skipped due to errors");
}
