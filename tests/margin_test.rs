//! Integration tests for margin insertion.

mod common;

use common::{corrupt_flate_stream, pdf_with_pages, PdfBuilder, PAGE_CONTENT};
use lopdf::{dictionary, Object};
use pdfyard::margin::{MarginInserter, MarginOptions};
use pdfyard::{insert_margins, insert_margins_bytes, Error, Rect, Rotation, SourceDocument};
use pretty_assertions::assert_eq;

const EPSILON: f32 = 0.01;

fn sizes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = SourceDocument::from_bytes(pdf).unwrap();
    doc.pages()
        .into_iter()
        .map(|(_, id)| {
            let geo = doc.page_geometry(id).unwrap();
            (geo.width(), geo.height())
        })
        .collect()
}

fn assert_close(actual: (f32, f32), expected: (f32, f32)) {
    assert!(
        (actual.0 - expected.0).abs() < EPSILON && (actual.1 - expected.1).abs() < EPSILON,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn test_a4_with_default_margin() {
    let pdf = pdf_with_pages(&[(595.0, 842.0)]);
    let out = insert_margins_bytes(&pdf, 15.0).unwrap();
    assert_close(sizes(&out)[0], (617.5, 864.5));
}

#[test]
fn test_page_count_and_order_preserved() {
    let input = [(595.0, 842.0), (300.0, 200.0), (612.0, 792.0)];
    let pdf = pdf_with_pages(&input);
    let out = insert_margins_bytes(&pdf, 20.0).unwrap();

    let output = sizes(&out);
    assert_eq!(output.len(), input.len());
    for (got, (w, h)) in output.into_iter().zip(input) {
        assert_close(got, (w + 30.0, h + 30.0));
    }
}

#[test]
fn test_zero_margin_keeps_dimensions() {
    let pdf = pdf_with_pages(&[(595.0, 842.0), (100.0, 50.0)]);
    let out = insert_margins_bytes(&pdf, 0.0).unwrap();
    assert_eq!(sizes(&out), vec![(595.0, 842.0), (100.0, 50.0)]);
}

#[test]
fn test_rotated_page_is_straightened() {
    let pdf = PdfBuilder::new()
        .page_with([0.0, 0.0, 595.0, 842.0], dictionary! { "Rotate" => 90 })
        .build();
    let out = insert_margins_bytes(&pdf, 15.0).unwrap();

    let doc = SourceDocument::from_bytes(&out).unwrap();
    let (_, id) = doc.pages()[0];
    let geo = doc.page_geometry(id).unwrap();
    assert_eq!(geo.rotation, Rotation::None);
    assert_close((geo.width(), geo.height()), (864.5, 617.5));
}

#[test]
fn test_crop_box_defines_visible_area() {
    let pdf = PdfBuilder::new()
        .page_with(
            [0.0, 0.0, 600.0, 800.0],
            dictionary! {
                "CropBox" => vec![50.into(), 50.into(), 550.into(), 750.into()],
            },
        )
        .build();
    let out = insert_margins_bytes(&pdf, 10.0).unwrap();

    let doc = SourceDocument::from_bytes(&out).unwrap();
    let (_, id) = doc.pages()[0];
    let geo = doc.page_geometry(id).unwrap();
    assert_eq!(geo.media_box, Rect::from_size(515.0, 715.0));
    assert_eq!(geo.crop_box, Some(geo.media_box));
}

#[test]
fn test_rotation_inherited_from_page_tree_is_cleared() {
    let pdf = PdfBuilder::new()
        .tree_attr("Rotate", 90)
        .page(300.0, 400.0)
        .build();
    let out = insert_margins_bytes(&pdf, 0.0).unwrap();

    let doc = SourceDocument::from_bytes(&out).unwrap();
    let (_, id) = doc.pages()[0];
    let geo = doc.page_geometry(id).unwrap();
    assert_eq!(geo.rotation, Rotation::None);
    assert_eq!((geo.width(), geo.height()), (400.0, 300.0));
}

#[test]
fn test_crop_box_inherited_from_page_tree_is_replaced() {
    let pdf = PdfBuilder::new()
        .tree_attr(
            "CropBox",
            Object::Array(vec![0.into(), 0.into(), 100.into(), 100.into()]),
        )
        .page(300.0, 400.0)
        .build();
    let out = insert_margins_bytes(&pdf, 15.0).unwrap();

    let doc = SourceDocument::from_bytes(&out).unwrap();
    let (_, id) = doc.pages()[0];
    let geo = doc.page_geometry(id).unwrap();
    assert_eq!(geo.media_box, Rect::from_size(122.5, 122.5));
    assert_close((geo.width(), geo.height()), (122.5, 122.5));
}

#[test]
fn test_original_content_is_drawn_through_form() {
    let pdf = pdf_with_pages(&[(200.0, 100.0)]);
    let inserter = MarginInserter::new(MarginOptions::new().with_margin_px(8.0));
    let out = inserter.insert_bytes(&pdf).unwrap();

    let doc = SourceDocument::from_bytes(&out).unwrap();
    let (_, id) = doc.pages()[0];
    let drawing = String::from_utf8(doc.page_content(id).unwrap()).unwrap();
    assert!(drawing.contains("1 0 0 1 6 6 cm"), "{}", drawing);

    let resources = doc.page_resources(id).unwrap();
    let xobjects = doc
        .resolve_dict(resources)
        .and_then(|r| r.get(b"XObject").ok())
        .and_then(|x| doc.resolve_dict(x))
        .unwrap();
    assert_eq!(xobjects.len(), 1);

    let (_, form_ref) = xobjects.iter().next().unwrap();
    let form = doc.resolve(form_ref).unwrap().as_stream().unwrap();
    assert_eq!(form.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Form");
    let bbox: Vec<f32> = form
        .dict
        .get(b"BBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect();
    assert_eq!(bbox, vec![0.0, 0.0, 200.0, 100.0]);

    let content = form.decompressed_content().unwrap();
    assert!(content
        .windows(PAGE_CONTENT.len())
        .any(|w| w == PAGE_CONTENT));
}

#[test]
fn test_annotations_are_dropped() {
    let mut builder = PdfBuilder::new();
    let annot = builder.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
    });
    let pdf = builder
        .page_with(
            [0.0, 0.0, 100.0, 100.0],
            dictionary! { "Annots" => vec![Object::Reference(annot)] },
        )
        .build();
    let out = insert_margins_bytes(&pdf, 15.0).unwrap();

    let doc = SourceDocument::from_bytes(&out).unwrap();
    let (_, id) = doc.pages()[0];
    let page = doc.raw_doc().get_dictionary(id).unwrap();
    assert!(page.get(b"Annots").is_err());
}

#[test]
fn test_sequential_matches_parallel() {
    let pdf = pdf_with_pages(&[(595.0, 842.0), (300.0, 400.0), (200.0, 200.0)]);
    let parallel = MarginInserter::new(MarginOptions::new()).insert_bytes(&pdf).unwrap();
    let sequential = MarginInserter::new(MarginOptions::new().sequential())
        .insert_bytes(&pdf)
        .unwrap();
    assert_eq!(sizes(&parallel), sizes(&sequential));
}

#[test]
fn test_insert_file_writes_destination() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.pdf");
    let dst = dir.path().join("out.pdf");
    std::fs::write(&src, pdf_with_pages(&[(595.0, 842.0), (595.0, 842.0)])).unwrap();

    let report = insert_margins(&src, &dst, 15.0).unwrap();
    assert_eq!(report.page_count(), 2);
    assert_eq!(report.pages[1].index, 1);
    assert_close((report.pages[1].width, report.pages[1].height), (617.5, 864.5));

    let out = std::fs::read(&dst).unwrap();
    assert_eq!(sizes(&out).len(), 2);
}

#[test]
fn test_non_pdf_source_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("notes.pdf");
    let dst = dir.path().join("out.pdf");
    std::fs::write(&src, "this is not a pdf").unwrap();

    let result = insert_margins(&src, &dst, 15.0);
    assert!(matches!(result, Err(Error::Open(_))), "{:?}", result);
    assert!(!dst.exists());
}

#[test]
fn test_missing_destination_directory() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.pdf");
    std::fs::write(&src, pdf_with_pages(&[(100.0, 100.0)])).unwrap();

    let dst = dir.path().join("missing").join("out.pdf");
    let result = insert_margins(&src, &dst, 15.0);
    assert!(matches!(result, Err(Error::Write { .. })), "{:?}", result);
}

#[test]
fn test_invalid_margin() {
    let pdf = pdf_with_pages(&[(100.0, 100.0)]);
    assert!(matches!(
        insert_margins_bytes(&pdf, f32::NAN),
        Err(Error::InvalidMargin(_))
    ));
}

#[test]
fn test_corrupt_content_stream_is_a_render_error() {
    let mut builder = PdfBuilder::new().page(100.0, 100.0);
    let corrupt = builder.add_object(corrupt_flate_stream());
    let pdf = builder
        .page_with([0.0, 0.0, 100.0, 100.0], dictionary! { "Contents" => corrupt })
        .build();

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.pdf");
    let dst = dir.path().join("out.pdf");
    std::fs::write(&src, pdf).unwrap();

    let result = insert_margins(&src, &dst, 15.0);
    assert!(matches!(result, Err(Error::Render { page: 1, .. })), "{:?}", result);
    assert!(!dst.exists());
}

#[test]
fn test_missing_media_box_is_a_render_error() {
    let pdf = PdfBuilder::new()
        .page(100.0, 100.0)
        .page_with([0.0, 0.0, 100.0, 100.0], dictionary! { "MediaBox" => Object::Null })
        .build();

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.pdf");
    let dst = dir.path().join("out.pdf");
    std::fs::write(&src, pdf).unwrap();

    let result = insert_margins(&src, &dst, 15.0);
    assert!(matches!(result, Err(Error::Render { page: 1, .. })), "{:?}", result);
    assert!(!dst.exists());
}
