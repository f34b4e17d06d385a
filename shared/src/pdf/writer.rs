//! Serializes laid-out pages into a PDF document with `lopdf`.
//!
//! The layout works in top-left millimetres; PDF wants bottom-left
//! points, so both axes are converted here and nowhere else. Text uses
//! the built-in Helvetica family, which keeps documents small and free
//! of font embedding.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

use crate::pdf::layout::{DrawCommand, FontStyle, Page, PAGE_HEIGHT_MM};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdf encoding failed: {0}")]
    Encode(#[from] lopdf::Error),

    #[error("pdf write failed: {0}")]
    Io(#[from] std::io::Error),
}

const MM_TO_PT: f32 = 72.0 / 25.4;
const A4_WIDTH_PT: f32 = 595.28;
const A4_HEIGHT_PT: f32 = 841.89;

fn x_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// Flips the y axis: layout measures down from the top edge.
fn y_pt(mm: f32) -> f32 {
    (PAGE_HEIGHT_MM - mm) * MM_TO_PT
}

const fn font_name(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => "F1",
        FontStyle::Bold => "F2",
        FontStyle::Oblique => "F3",
    }
}

fn encode_page(page: &Page) -> Result<Vec<u8>, PdfError> {
    let mut operations = Vec::new();
    for command in &page.commands {
        match command {
            DrawCommand::Text {
                x,
                y,
                size,
                style,
                color,
                text,
            } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![font_name(*style).into(), (*size).into()],
                ));
                operations.push(Operation::new(
                    "rg",
                    vec![color.r.into(), color.g.into(), color.b.into()],
                ));
                operations.push(Operation::new("Td", vec![x_pt(*x).into(), y_pt(*y).into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(text.as_str())],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                operations.push(Operation::new(
                    "rg",
                    vec![color.r.into(), color.g.into(), color.b.into()],
                ));
                operations.push(Operation::new(
                    "re",
                    vec![
                        x_pt(*x).into(),
                        y_pt(*y + *height).into(),
                        (*width * MM_TO_PT).into(),
                        (*height * MM_TO_PT).into(),
                    ],
                ));
                operations.push(Operation::new("f", vec![]));
            }
            DrawCommand::StrokeRect {
                x,
                y,
                width,
                height,
                color,
                line_width,
            } => {
                operations.push(Operation::new(
                    "RG",
                    vec![color.r.into(), color.g.into(), color.b.into()],
                ));
                operations.push(Operation::new("w", vec![(*line_width * MM_TO_PT).into()]));
                operations.push(Operation::new(
                    "re",
                    vec![
                        x_pt(*x).into(),
                        y_pt(*y + *height).into(),
                        (*width * MM_TO_PT).into(),
                        (*height * MM_TO_PT).into(),
                    ],
                ));
                operations.push(Operation::new("S", vec![]));
            }
            DrawCommand::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                line_width,
            } => {
                operations.push(Operation::new(
                    "RG",
                    vec![color.r.into(), color.g.into(), color.b.into()],
                ));
                operations.push(Operation::new("w", vec![(*line_width * MM_TO_PT).into()]));
                operations.push(Operation::new("m", vec![x_pt(*x1).into(), y_pt(*y1).into()]));
                operations.push(Operation::new("l", vec![x_pt(*x2).into(), y_pt(*y2).into()]));
                operations.push(Operation::new("S", vec![]));
            }
        }
    }
    let content = Content { operations };
    Ok(content.encode()?)
}

/// Builds the complete document: page tree, Helvetica resources,
/// catalog, trailer.
pub fn write_document(pages: &[Page]) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let font_oblique = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Oblique",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
            "F3" => font_oblique,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, encode_page(page)?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    #[allow(clippy::cast_possible_wrap)]
    let count = pages.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH_PT.into(), A4_HEIGHT_PT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
