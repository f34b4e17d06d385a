//! Composition of the AI analysis report.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, ProcessingSummary, RecommendationPriority};
use crate::event::ReportId;
use crate::formatter::{self, Line};
use crate::pdf::layout::{
    DrawCommand, FontStyle, LayoutEngine, Page, Rgb, CONTENT_WIDTH_MM, FIRST_PAGE_TOP_MM,
    FOOTER_Y_MM, MARGIN_X_MM, PAGE_WIDTH_MM,
};
use crate::pdf::writer::{self, PdfError};
use crate::ANALYSIS_HEADER_THRESHOLD;

const BRAND_BLUE: Rgb = Rgb::new(0.231, 0.510, 0.965);
const PRIORITY_RED: Rgb = Rgb::new(0.937, 0.267, 0.267);
const PRIORITY_AMBER: Rgb = Rgb::new(0.961, 0.620, 0.043);
const PRIORITY_GREEN: Rgb = Rgb::new(0.063, 0.725, 0.506);

const fn priority_color(priority: RecommendationPriority) -> Rgb {
    match priority {
        RecommendationPriority::High => PRIORITY_RED,
        RecommendationPriority::Medium => PRIORITY_AMBER,
        RecommendationPriority::Low => PRIORITY_GREEN,
    }
}

/// Everything the renderer needs, captured at export time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PdfReportData {
    pub report_id: ReportId,
    pub title: String,
    pub generated_at_ms: u64,
    pub results: Vec<AnalysisResult>,
    pub summary: ProcessingSummary,
}

impl PdfReportData {
    #[must_use]
    pub fn new(report_id: ReportId, results: Vec<AnalysisResult>, generated_at_ms: u64) -> Self {
        let summary = ProcessingSummary::from_results(&results);
        Self {
            report_id,
            title: "AI Analysis Report".to_string(),
            generated_at_ms,
            results,
            summary,
        }
    }

    fn generated_date(&self) -> String {
        Utc.timestamp_millis_opt(i64::try_from(self.generated_at_ms).unwrap_or(0))
            .single()
            .map_or_else(|| "unknown-date".to_string(), |dt| dt.format("%Y-%m-%d").to_string())
    }

    /// Default download name, e.g.
    /// `ISAAC_AI_Analysis_Report_rep-1_2026-08-24.pdf`.
    #[must_use]
    pub fn suggested_filename(&self) -> String {
        format!(
            "ISAAC_AI_Analysis_Report_{}_{}.pdf",
            self.report_id,
            self.generated_date()
        )
    }

    /// Lays the report out into pages of draw commands.
    #[must_use]
    pub fn render(&self) -> Vec<Page> {
        let mut engine = LayoutEngine::new(FIRST_PAGE_TOP_MM);
        self.draw_header(&mut engine);
        self.draw_summary_card(&mut engine);

        for result in &self.results {
            self.draw_result(&mut engine, result);
            engine.advance(6.0);
        }

        let generated = self.generated_date();
        engine.finish(move |page_no, total| {
            vec![
                DrawCommand::Line {
                    x1: MARGIN_X_MM,
                    y1: FOOTER_Y_MM - 4.0,
                    x2: PAGE_WIDTH_MM - MARGIN_X_MM,
                    y2: FOOTER_Y_MM - 4.0,
                    color: Rgb::GRAY,
                    line_width: 0.3,
                },
                DrawCommand::Text {
                    x: MARGIN_X_MM,
                    y: FOOTER_Y_MM,
                    size: 8.0,
                    style: FontStyle::Regular,
                    color: Rgb::GRAY,
                    text: format!("ISAAC AI Analysis Report, generated {generated}"),
                },
                DrawCommand::Text {
                    x: PAGE_WIDTH_MM - MARGIN_X_MM - 25.0,
                    y: FOOTER_Y_MM,
                    size: 8.0,
                    style: FontStyle::Regular,
                    color: Rgb::GRAY,
                    text: format!("Page {page_no} of {total}"),
                },
            ]
        })
    }

    /// Renders and encodes the finished document.
    pub fn render_pdf(&self) -> Result<Vec<u8>, PdfError> {
        writer::write_document(&self.render())
    }

    fn draw_header(&self, engine: &mut LayoutEngine) {
        engine.raw(DrawCommand::FillRect {
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH_MM,
            height: 36.0,
            color: BRAND_BLUE,
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM,
            y: 16.0,
            size: 20.0,
            style: FontStyle::Bold,
            color: Rgb::WHITE,
            text: self.title.clone(),
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM,
            y: 25.0,
            size: 10.0,
            style: FontStyle::Regular,
            color: Rgb::WHITE,
            text: format!("Report {}", self.report_id),
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM,
            y: 31.0,
            size: 9.0,
            style: FontStyle::Regular,
            color: Rgb::WHITE,
            text: format!("Generated {}", self.generated_date()),
        });
    }

    fn draw_summary_card(&self, engine: &mut LayoutEngine) {
        engine.raw(DrawCommand::FillRect {
            x: MARGIN_X_MM,
            y: 44.0,
            width: CONTENT_WIDTH_MM,
            height: 28.0,
            color: Rgb::LIGHT_GRAY,
        });
        engine.raw(DrawCommand::StrokeRect {
            x: MARGIN_X_MM,
            y: 44.0,
            width: CONTENT_WIDTH_MM,
            height: 28.0,
            color: Rgb::GRAY,
            line_width: 0.3,
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM + 5.0,
            y: 52.0,
            size: 11.0,
            style: FontStyle::Bold,
            color: Rgb::BLACK,
            text: "Processing Summary".to_string(),
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM + 5.0,
            y: 60.0,
            size: 9.0,
            style: FontStyle::Regular,
            color: Rgb::BLACK,
            text: format!(
                "Total: {}   Completed: {}   Processing: {}   Failed: {}",
                self.summary.total,
                self.summary.completed,
                self.summary.processing,
                self.summary.failed
            ),
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM + 5.0,
            y: 67.0,
            size: 9.0,
            style: FontStyle::Regular,
            color: Rgb::BLACK,
            text: format!(
                "Average Confidence: {}",
                formatter::format_confidence(self.summary.average_confidence)
            ),
        });
    }

    fn draw_result(&self, engine: &mut LayoutEngine, result: &AnalysisResult) {
        engine.ensure_room(28.0);

        // Header card with the confidence pinned top-right.
        let top = engine.cursor();
        engine.raw(DrawCommand::FillRect {
            x: MARGIN_X_MM,
            y: top,
            width: CONTENT_WIDTH_MM,
            height: 12.0,
            color: Rgb::LIGHT_GRAY,
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM + 4.0,
            y: top + 8.0,
            size: 12.0,
            style: FontStyle::Bold,
            color: Rgb::BLACK,
            text: format!("{} ({})", result.kind.label(), result.evidence_id),
        });
        engine.raw(DrawCommand::Text {
            x: MARGIN_X_MM + CONTENT_WIDTH_MM - 22.0,
            y: top + 8.0,
            size: 12.0,
            style: FontStyle::Bold,
            color: BRAND_BLUE,
            text: result.confidence.percent_label(),
        });
        engine.advance(14.0);

        engine.text_line(
            MARGIN_X_MM + 4.0,
            9.0,
            FontStyle::Regular,
            Rgb::GRAY,
            &format!(
                "Status: {}   Processing Time: {}   Tokens: {}",
                result.status.label(),
                formatter::format_processing_time(result.processing_time_ms),
                result.token_count
            ),
        );
        engine.advance(2.0);

        for section in formatter::parse_formatted_text(&result.analysis_text, ANALYSIS_HEADER_THRESHOLD)
        {
            engine.ensure_room(12.0);
            engine.text_line(MARGIN_X_MM, 11.0, FontStyle::Bold, Rgb::BLACK, &section.title);
            for line in &section.lines {
                match line {
                    Line::Bullet(text) => engine.wrapped_text(
                        MARGIN_X_MM + 4.0,
                        CONTENT_WIDTH_MM - 4.0,
                        10.0,
                        FontStyle::Regular,
                        Rgb::BLACK,
                        &format!("• {text}"),
                    ),
                    Line::Numbered { number, text } => engine.wrapped_text(
                        MARGIN_X_MM + 4.0,
                        CONTENT_WIDTH_MM - 4.0,
                        10.0,
                        FontStyle::Regular,
                        Rgb::BLACK,
                        &format!("{number}. {text}"),
                    ),
                    Line::Paragraph(text) => engine.wrapped_text(
                        MARGIN_X_MM,
                        CONTENT_WIDTH_MM,
                        10.0,
                        FontStyle::Regular,
                        Rgb::BLACK,
                        text,
                    ),
                }
            }
            engine.advance(2.0);
        }

        self.draw_detections(engine, "Detected Vehicles", result.vehicles.iter().map(|v| (v.summary(), v.confidence.percent_label())));
        self.draw_detections(engine, "Detected Persons", result.persons.iter().map(|p| (p.summary(), p.confidence.percent_label())));
        self.draw_detections(engine, "Road Signs", result.road_signs.iter().map(|s| (s.summary(), s.confidence.percent_label())));

        if !result.scene.is_empty() {
            engine.ensure_room(12.0);
            engine.text_line(MARGIN_X_MM, 11.0, FontStyle::Bold, Rgb::BLACK, "Scene Analysis");
            for entry in &result.scene {
                engine.wrapped_text(
                    MARGIN_X_MM + 4.0,
                    CONTENT_WIDTH_MM - 4.0,
                    10.0,
                    FontStyle::Regular,
                    Rgb::BLACK,
                    &format!("{}: {}", entry.label, entry.value),
                );
            }
            engine.advance(2.0);
        }

        if let Some(recommendations) = &result.recommendations {
            engine.ensure_room(20.0);
            engine.text_line(MARGIN_X_MM, 11.0, FontStyle::Bold, Rgb::BLACK, "Recommendations");

            let badge_top = engine.cursor();
            engine.raw(DrawCommand::FillRect {
                x: MARGIN_X_MM,
                y: badge_top,
                width: 42.0,
                height: 7.0,
                color: priority_color(recommendations.priority),
            });
            engine.raw(DrawCommand::Text {
                x: MARGIN_X_MM + 3.0,
                y: badge_top + 5.0,
                size: 9.0,
                style: FontStyle::Bold,
                color: Rgb::WHITE,
                text: recommendations.priority.label().to_string(),
            });
            engine.advance(10.0);

            if let Some(summary) = &recommendations.summary {
                engine.wrapped_text(
                    MARGIN_X_MM,
                    CONTENT_WIDTH_MM,
                    10.0,
                    FontStyle::Regular,
                    Rgb::BLACK,
                    summary,
                );
            }
            if !recommendations.additional_evidence.is_empty() {
                engine.text_line(
                    MARGIN_X_MM,
                    10.0,
                    FontStyle::Bold,
                    Rgb::BLACK,
                    "Additional Evidence Needed",
                );
                for item in &recommendations.additional_evidence {
                    engine.wrapped_text(
                        MARGIN_X_MM + 4.0,
                        CONTENT_WIDTH_MM - 4.0,
                        10.0,
                        FontStyle::Regular,
                        Rgb::BLACK,
                        &format!("• {item}"),
                    );
                }
            }
            if !recommendations.expert_consultation.is_empty() {
                engine.text_line(
                    MARGIN_X_MM,
                    10.0,
                    FontStyle::Bold,
                    Rgb::BLACK,
                    "Expert Consultation",
                );
                for item in &recommendations.expert_consultation {
                    engine.wrapped_text(
                        MARGIN_X_MM + 4.0,
                        CONTENT_WIDTH_MM - 4.0,
                        10.0,
                        FontStyle::Regular,
                        Rgb::BLACK,
                        &format!("• {item}"),
                    );
                }
            }
        }
    }

    #[allow(clippy::unused_self)]
    fn draw_detections<I>(&self, engine: &mut LayoutEngine, heading: &str, items: I)
    where
        I: Iterator<Item = (String, String)>,
    {
        let items: Vec<_> = items.collect();
        if items.is_empty() {
            return;
        }
        engine.ensure_room(12.0);
        engine.text_line(MARGIN_X_MM, 11.0, FontStyle::Bold, Rgb::BLACK, heading);
        for (summary, confidence) in items {
            engine.wrapped_text(
                MARGIN_X_MM + 4.0,
                CONTENT_WIDTH_MM - 4.0,
                10.0,
                FontStyle::Regular,
                Rgb::BLACK,
                &format!("• {summary} ({confidence})"),
            );
        }
        engine.advance(2.0);
    }
}
