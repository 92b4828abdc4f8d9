use super::insights::{ALL_STRONG_MESSAGE, NEXT_STEPS};
use super::markup::escape_html;
use super::ReportDocument;
use crate::assessment::readiness::SeverityBand;
use chrono::Datelike;
use std::fmt::Write;

const ASSESSMENT_TYPE: &str = "ISO 9001:2015 Readiness Assessment";
const SUPPORT_EMAIL: &str = "support@qse-academy.com";
const SUPPORT_SITE: &str = "https://qse-academy.com";

pub(super) fn render_html(doc: &ReportDocument) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(
        html,
        "<title>ISO 9001 Assessment Report{}</title>",
        provided(&doc.user.company)
            .map(|company| format!(" - {}", escape_html(company)))
            .unwrap_or_default()
    );
    html.push_str("<style>\n");
    html.push_str(&stylesheet(doc.readiness.severity_color));
    html.push_str("</style>\n</head>\n<body>\n");

    write_header(&mut html, doc);
    write_summary(&mut html, doc);
    write_readiness(&mut html, doc);
    write_charts(&mut html, doc);
    write_chapter_breakdown(&mut html, doc);
    write_recommendations(&mut html, doc);
    write_footer(&mut html, doc);

    html.push_str("</body>\n</html>\n");
    html
}

/// Treats missing and blank optional fields the same way.
fn provided(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn write_header(html: &mut String, doc: &ReportDocument) {
    html.push_str("<div class=\"header\">\n");
    html.push_str("<div class=\"brand\">QSE ACADEMY</div>\n");
    html.push_str("<h1>ISO 9001 Assessment Report</h1>\n");
    if let Some(company) = provided(&doc.user.company) {
        let _ = writeln!(html, "<p class=\"company\">for {}</p>", escape_html(company));
    }
    html.push_str("<p>Comprehensive Readiness Analysis</p>\n</div>\n");
}

fn write_summary(html: &mut String, doc: &ReportDocument) {
    let participant = provided(&doc.user.first_name).unwrap_or("Anonymous");
    let company = provided(&doc.user.company).unwrap_or("No company provided");
    let email = Some(doc.user.email.trim())
        .filter(|email| !email.is_empty())
        .unwrap_or("Not provided");

    html.push_str("<div class=\"summary-section\">\n<h2>Assessment Summary</h2>\n");
    let _ = writeln!(
        html,
        "<p><strong>Participant:</strong> {}</p>",
        escape_html(participant)
    );
    let _ = writeln!(html, "<p><strong>Company:</strong> {}</p>", escape_html(company));
    let _ = writeln!(html, "<p><strong>Email:</strong> {}</p>", escape_html(email));
    if let Some(report_id) = &doc.context.report_id {
        let _ = writeln!(
            html,
            "<p><strong>Report ID:</strong> <code>{}</code></p>",
            escape_html(report_id)
        );
    }
    let _ = writeln!(
        html,
        "<p><strong>Completed:</strong> {}</p>",
        doc.context.generated_on.format("%B %-d, %Y")
    );
    let _ = writeln!(
        html,
        "<p><strong>Assessment Type:</strong> {ASSESSMENT_TYPE}</p>\n</div>"
    );
}

fn write_readiness(html: &mut String, doc: &ReportDocument) {
    html.push_str("<div class=\"readiness-gauge\">\n<h2>Overall Readiness Score</h2>\n");
    let _ = writeln!(
        html,
        "<div class=\"score-display\">{}%</div>",
        doc.overall_percentage
    );
    let _ = writeln!(
        html,
        "<div class=\"readiness-level\">{}</div>",
        escape_html(doc.readiness.level)
    );
    let _ = writeln!(
        html,
        "<div class=\"readiness-description\">{}</div>",
        escape_html(doc.readiness.description)
    );

    html.push_str("<div class=\"stats\">\n");
    for (value, caption) in [
        (doc.overall_score.to_string(), "Points Achieved"),
        (doc.overall_max_score.to_string(), "Total Possible"),
        (doc.chapters.len().to_string(), "Chapters Assessed"),
        (doc.strong_chapters.to_string(), "Strong Areas"),
    ] {
        let _ = writeln!(
            html,
            "<div class=\"stat\"><div class=\"stat-value\">{value}</div><div class=\"stat-caption\">{caption}</div></div>"
        );
    }
    html.push_str("</div>\n");
    let _ = writeln!(
        html,
        "<p class=\"commentary\">{}</p>\n</div>",
        escape_html(doc.commentary.overall)
    );
}

fn write_charts(html: &mut String, doc: &ReportDocument) {
    html.push_str("<div class=\"charts-section\">\n<h2>Performance Analysis</h2>\n");
    html.push_str("<div class=\"chart-grid\">\n");

    html.push_str("<div class=\"chart-container\">\n<h3>Readiness Radar Chart</h3>\n");
    html.push_str(&doc.radar.to_svg());
    html.push_str(
        "\n<p class=\"chart-caption\">Visual representation of readiness across all categories</p>\n",
    );
    let _ = writeln!(
        html,
        "<p class=\"chart-note\">{}</p>\n</div>",
        escape_html(&doc.commentary.compliance_overview)
    );

    html.push_str("<div class=\"chart-container\">\n<h3>Chapter Scores</h3>\n");
    html.push_str(&doc.bars.to_svg());
    html.push_str(
        "\n<p class=\"chart-caption\">Individual chapter performance breakdown</p>\n",
    );
    let _ = writeln!(
        html,
        "<p class=\"chart-note\">{}</p>\n</div>",
        escape_html(&doc.commentary.chapter_breakdown)
    );

    html.push_str("</div>\n</div>\n");
}

fn write_chapter_breakdown(html: &mut String, doc: &ReportDocument) {
    html.push_str("<div class=\"results-grid\">\n");
    for chapter in &doc.chapters {
        let result = &chapter.result;
        let color = SeverityBand::for_percentage(result.percentage).progress_color();
        let _ = writeln!(
            html,
            "<div class=\"result-card\">\n<div class=\"result-title\">{}</div>",
            escape_html(&chapter.title)
        );
        let _ = writeln!(
            html,
            "<div class=\"progress-bar\"><div class=\"progress-fill\" style=\"width: {}%; background: {color};\"></div></div>",
            result.percentage
        );
        let _ = writeln!(
            html,
            "<div class=\"score-text\"><span>Score: {}/{}</span><span>{}/{} questions</span></div>\n</div>",
            result.score, result.max_score, result.completed_questions, result.total_questions
        );
    }
    html.push_str("</div>\n");
}

fn write_recommendations(html: &mut String, doc: &ReportDocument) {
    html.push_str("<div class=\"recommendations\">\n");
    html.push_str("<h3>Recommendations for Improvement</h3>\n");
    let _ = writeln!(
        html,
        "<p>{}</p>",
        escape_html(&doc.commentary.priority_items)
    );
    html.push_str("<ul>\n");
    for recommendation in &doc.recommendations {
        let _ = writeln!(
            html,
            "<li>Focus on improving <strong>{}</strong> - Current score: {}%<br><span class=\"action\">{}</span></li>",
            escape_html(&recommendation.title),
            recommendation.percentage,
            escape_html(&recommendation.action)
        );
    }
    if doc.all_chapters_strong {
        let _ = writeln!(html, "<li>{ALL_STRONG_MESSAGE}</li>");
    }
    html.push_str("</ul>\n<p><strong>Next Steps:</strong></p>\n<ul>\n");
    for step in NEXT_STEPS {
        let _ = writeln!(html, "<li>{}</li>", escape_html(step));
    }
    html.push_str("</ul>\n</div>\n");
}

fn write_footer(html: &mut String, doc: &ReportDocument) {
    html.push_str("<div class=\"contact-info\">\n<h3>Need Expert Guidance?</h3>\n");
    html.push_str(
        "<p>Our ISO 9001 specialists are ready to help you achieve certification.</p>\n",
    );
    let _ = writeln!(
        html,
        "<p><a href=\"mailto:{SUPPORT_EMAIL}\">{SUPPORT_EMAIL}</a></p>\n<p><a href=\"{SUPPORT_SITE}\">www.qse-academy.com</a></p>\n</div>"
    );
    html.push_str("<div class=\"footer\">\n");
    html.push_str(
        "<p>This report was generated by QSE Academy's ISO 9001 Assessment Tool.</p>\n",
    );
    let _ = writeln!(
        html,
        "<p>&copy; {} QSE Academy. All rights reserved.</p>",
        doc.context.generated_on.year()
    );
    html.push_str("<p><em>This assessment provides an indication of ISO 9001 readiness and should be supplemented with professional consultation.</em></p>\n</div>\n");
}

fn stylesheet(accent: &str) -> String {
    format!(
        r#"body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #1f2937; max-width: 800px; margin: 0 auto; padding: 20px; background: white; }}
.header {{ text-align: center; margin-bottom: 40px; padding: 30px; background: linear-gradient(135deg, #2563eb 0%, #1d4ed8 100%); color: white; border-radius: 12px; }}
.brand {{ width: 200px; margin: 0 auto 20px; background: white; padding: 15px; border-radius: 8px; font-weight: bold; font-size: 24px; color: #2563eb; }}
.header h1 {{ margin: 0; font-size: 2.5rem; font-weight: 700; }}
.header p {{ margin: 10px 0 0 0; font-size: 1.2rem; opacity: 0.9; }}
.header .company {{ font-size: 1.3rem; font-weight: 600; }}
.summary-section {{ background: #f8fafc; padding: 30px; border-radius: 12px; margin-bottom: 30px; border-left: 5px solid #2563eb; }}
.summary-section code {{ background: #f3f4f6; padding: 2px 8px; border-radius: 4px; font-family: monospace; }}
.readiness-gauge {{ text-align: center; margin: 30px 0; padding: 40px; background: #f8fafc; border-radius: 12px; border-left: 5px solid {accent}; }}
.score-display {{ font-size: 4rem; font-weight: bold; color: {accent}; margin-bottom: 15px; }}
.readiness-level {{ font-size: 1.8rem; font-weight: 600; color: {accent}; margin-bottom: 15px; }}
.readiness-description {{ color: #6b7280; font-size: 1.1rem; }}
.stats {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: 10px; margin: 20px 0; }}
.stat-value {{ font-size: 1.5rem; font-weight: 600; color: #2563eb; }}
.stat-caption {{ font-size: 0.85rem; color: #6b7280; }}
.commentary {{ text-align: left; color: #4b5563; }}
.charts-section {{ margin: 40px 0; text-align: center; }}
.chart-container {{ background: white; padding: 30px; border-radius: 12px; box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1); margin-bottom: 30px; }}
.chart-grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 30px; margin: 30px 0; }}
.chart-caption {{ margin-top: 15px; color: #6b7280; font-size: 0.9rem; }}
.chart-note {{ color: #4b5563; font-size: 0.85rem; }}
.results-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; margin: 30px 0; }}
.result-card {{ background: white; padding: 25px; border-radius: 12px; box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1); border-left: 4px solid #2563eb; }}
.result-title {{ font-size: 1.2rem; font-weight: 600; margin-bottom: 15px; }}
.progress-bar {{ width: 100%; height: 12px; background: #e5e7eb; border-radius: 6px; overflow: hidden; margin: 10px 0; }}
.progress-fill {{ height: 100%; border-radius: 6px; }}
.score-text {{ display: flex; justify-content: space-between; margin-top: 8px; font-size: 0.9rem; color: #6b7280; }}
.recommendations {{ background: #fef3c7; border: 1px solid #f59e0b; border-radius: 12px; padding: 30px; margin: 30px 0; color: #92400e; }}
.recommendations h3 {{ margin-top: 0; }}
.recommendations .action {{ font-size: 0.9rem; }}
.contact-info {{ background: #2563eb; color: white; padding: 25px; border-radius: 12px; margin: 30px 0; text-align: center; }}
.contact-info h3 {{ margin-top: 0; color: white; }}
.contact-info a {{ color: #bfdbfe; text-decoration: none; }}
.footer {{ text-align: center; margin-top: 50px; padding: 30px; background: #f8fafc; border-radius: 12px; color: #6b7280; }}
@media print {{
  body {{ margin: 0; padding: 15px; }}
  .header, .result-card, .chart-container {{ break-inside: avoid; }}
  .chart-grid {{ grid-template-columns: 1fr; }}
}}
"#
    )
}
