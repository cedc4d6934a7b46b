//! End-to-end scenarios on synthetic pages.

mod common;

use common::{
    FIGURE_REGION, FILLED_REGION, blank_page, coverage, dark_ratio, figure_page,
    filled_block_page, outline,
};
use image::{Rgb, RgbImage};
use oar_diagram::domain::{Candidate, CandidateSource, PageSize, PixelBox, ScoredBox};
use oar_diagram::prelude::*;
use oar_diagram::proposals::BandMerger;

#[test]
fn blank_page_yields_nothing_at_every_stage() {
    let result = DiagramDetector::default().detect(&blank_page(600, 800));

    assert!(result.is_empty());
    assert_eq!(result.stats.total_proposals(), 0);
    assert_eq!(result.stats.deduplicated, 0);
    assert_eq!(result.stats.analyzed, 0);
    assert_eq!(result.stats.after_nms, 0);
    assert_eq!(result.stats.selected, 0);
}

/// Checks that `page` yields exactly one diagram around `region` and that
/// exporting it writes a single padded crop.
fn assert_single_figure(page: &RgbImage, region: &PixelBox) {
    let detector = DiagramDetector::default();
    let result = detector.detect(page);

    assert_eq!(result.len(), 1, "diagrams: {:?}\n{}", result.diagrams, result.stats);
    let bbox = result.diagrams[0].bbox;
    assert!(bbox.is_within(result.page));
    assert!(coverage(&bbox, region) > 0.9, "bbox {bbox:?}");

    let dir = tempfile::tempdir().unwrap();
    let exporter = &detector.config().export;
    let paths = exporter.export(page, &result.diagrams, dir.path()).unwrap();
    assert_eq!(paths, vec![dir.path().join("diagram_0.png")]);

    let crop_box = exporter.crop_box(&bbox, result.page);
    assert_eq!(coverage(&crop_box, region), 1.0, "crop {crop_box:?}");
    // every side lies within the padding plus a small detection slack
    let slack = exporter.min_padding + 20;
    assert!(region.x - crop_box.x <= slack);
    assert!(region.y - crop_box.y <= slack);
    assert!(crop_box.right() - region.right() <= slack);
    assert!(crop_box.bottom() - region.bottom() <= slack);

    let crop = load_image(&paths[0]).unwrap();
    assert_eq!(crop.dimensions(), (crop_box.width, crop_box.height));
}

#[test]
fn outlined_figure_yields_one_crop() {
    assert_single_figure(&figure_page(), &FIGURE_REGION);
}

#[test]
fn filled_figure_yields_one_crop() {
    let page = filled_block_page();
    let ink = dark_ratio(&page, &FILLED_REGION);
    assert!((0.14..0.18).contains(&ink), "ink ratio {ink}");
    assert_single_figure(&page, &FILLED_REGION);
}

#[test]
fn horizontal_rule_is_not_a_diagram() {
    let mut page = blank_page(600, 800);
    outline(&mut page, 20, 400, 560, 3, 3);
    assert!(detect_diagrams(&page).is_empty());
}

#[test]
fn detection_is_deterministic() {
    let page = figure_page();
    let detector = DiagramDetector::default();
    let first = detector.detect(&page);
    let second = detector.detect(&page);

    assert_eq!(first.diagrams, second.diagrams);
    assert_eq!(first.stats.total_proposals(), second.stats.total_proposals());
    assert_eq!(first.stats.analyzed, second.stats.analyzed);
}

#[test]
fn adjacent_bands_merge_into_one() {
    let page = PageSize::new(1000, 1000);
    let bands = [
        Candidate::new(PixelBox::new(100, 300, 800, 100), CandidateSource::Layout),
        Candidate::new(PixelBox::new(100, 420, 800, 130), CandidateSource::Layout),
    ];
    let merged = BandMerger::default().merge(&bands, page);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].bbox, PixelBox::new(100, 300, 800, 250));
    assert!((merged[0].weight - (1.35 + 1.35 * 0.85)).abs() < 1e-9);
    // inputs are left as they were
    assert_eq!(bands[0].bbox.height, 100);
}

#[test]
fn extract_writes_figure_crops() {
    let dir = tempfile::tempdir().unwrap();
    let page_path = dir.path().join("page.png");
    figure_page().save(&page_path).unwrap();
    let out = dir.path().join("crops");

    let paths = extract_diagrams(&page_path, &out).unwrap();

    assert_eq!(paths, vec![out.join("diagram_0.png")]);
    let crop = load_image(&paths[0]).unwrap();
    assert!(crop.width() >= FIGURE_REGION.width && crop.height() >= FIGURE_REGION.height);
}

#[test]
fn unreadable_page_still_creates_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let page_path = dir.path().join("broken.png");
    std::fs::write(&page_path, b"not an image").unwrap();
    let out = dir.path().join("nested").join("crops");

    let paths = extract_diagrams(&page_path, &out).unwrap();
    assert!(paths.is_empty());
    assert!(out.is_dir());
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn export_follows_reading_order() {
    let mut page = blank_page(400, 400);
    let marks = [
        (PixelBox::new(220, 250, 100, 100), Rgb([200, 0, 0])),
        (PixelBox::new(30, 250, 100, 100), Rgb([0, 200, 0])),
        (PixelBox::new(150, 40, 100, 100), Rgb([0, 0, 200])),
    ];
    for (bbox, color) in &marks {
        for y in bbox.y..bbox.bottom() {
            for x in bbox.x..bbox.right() {
                page.put_pixel(x, y, *color);
            }
        }
    }
    // higher score first, as the detector returns them
    let boxes: Vec<ScoredBox> = marks
        .iter()
        .enumerate()
        .map(|(i, (bbox, _))| ScoredBox::new(*bbox, 3.0 - i as f64))
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let paths = DiagramExporter::default()
        .export(&page, &boxes, dir.path())
        .unwrap();
    assert_eq!(paths.len(), 3);

    // top box first, then left to right
    let expected_colors = [marks[2].1, marks[1].1, marks[0].1];
    for (path, color) in paths.iter().zip(expected_colors) {
        let crop = load_image(path).unwrap();
        // 8px padding on every side
        assert_eq!(crop.dimensions(), (116, 116));
        assert_eq!(*crop.get_pixel(58, 58), color);
        assert_eq!(*crop.get_pixel(2, 2), Rgb([255, 255, 255]));
    }
}

#[test]
fn config_file_overrides_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "selection": { "nms": { "max_detections": 1 } }, "export": { "file_prefix": "fig" } }"#,
    )
    .unwrap();

    let config = DetectorConfig::from_json_file(&path).unwrap();
    assert_eq!(config.selection.nms.max_detections, 1);
    assert_eq!(config.export.file_name(2), "fig_2.png");

    let detector = DiagramDetector::new(config).unwrap();
    assert!(detector.detect(&figure_page()).len() <= 1);
}
