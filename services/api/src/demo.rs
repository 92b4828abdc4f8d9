use crate::infra::build_service;
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use iso_readiness::assessment::report::insights;
use iso_readiness::assessment::{
    render_report, report_chapters, scoring, Answer, AnswerSheet, AnswerValue, ChapterSummary,
    CompletedAssessment, NavigationAction, QuestionCatalog, ReportContext, UserInfo,
    APP_READINESS_POLICY, REPORT_READINESS_POLICY,
};
use iso_readiness::config::{DeliveryConfig, SessionLimits};
use iso_readiness::error::AppError;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON file with `answers` (question_id/value pairs) and an optional `user`
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Where to write the rendered HTML report
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Report date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Identifier printed in the report summary
    #[arg(long)]
    pub(crate) report_id: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Answer pattern used for the sample organization
    #[arg(long, value_enum, default_value_t = DemoProfile::Mixed)]
    pub(crate) profile: DemoProfile,
    /// Email address the sample report is addressed to
    #[arg(long, default_value = "quality.lead@example.com")]
    pub(crate) email: String,
    /// Company name shown on the sample report
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Directory to write the rendered report into
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoProfile {
    /// Nearly every clause implemented
    Strong,
    /// Solid foundations with gaps in evaluation and improvement
    #[default]
    Mixed,
    /// Little of the QMS in place yet
    Early,
}

impl DemoProfile {
    fn answer_for(self, chapter_index: usize, question_index: usize) -> AnswerValue {
        match self {
            Self::Strong => match question_index % 7 {
                6 => AnswerValue::Partial,
                _ => AnswerValue::Yes,
            },
            Self::Mixed if chapter_index >= 4 => match question_index % 3 {
                0 => AnswerValue::Partial,
                1 => AnswerValue::No,
                _ => AnswerValue::Na,
            },
            Self::Mixed => match question_index % 4 {
                3 => AnswerValue::Partial,
                _ => AnswerValue::Yes,
            },
            Self::Early => match question_index % 3 {
                0 => AnswerValue::Partial,
                _ => AnswerValue::No,
            },
        }
    }
}

/// Answers file accepted by the `report` command.
#[derive(Debug, Deserialize)]
struct AnswersFile {
    #[serde(default)]
    user: UserInfo,
    answers: Vec<Answer>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        answers,
        output,
        date,
        report_id,
    } = args;

    let raw = std::fs::read_to_string(&answers)?;
    let file: AnswersFile = serde_json::from_str(&raw)?;
    let catalog = QuestionCatalog::iso9001();

    let mut sheet = AnswerSheet::new();
    let mut ignored = Vec::new();
    for answer in file.answers {
        if catalog.locate(&answer.question_id).is_none() {
            ignored.push(answer.question_id.clone());
            continue;
        }
        sheet.record(answer);
    }

    let results = scoring::aggregate_all(catalog.chapters(), &sheet);
    let overall = scoring::overall(&results);
    let chapters = report_chapters(catalog, &results);
    let context = ReportContext {
        report_id,
        generated_on: date.unwrap_or_else(|| Local::now().date_naive()),
    };
    let html = render_report(
        &file.user,
        &chapters,
        overall.score,
        overall.percentage,
        &context,
    );
    std::fs::write(&output, html)?;

    let readiness = REPORT_READINESS_POLICY.classify(overall.percentage);
    println!("ISO 9001:2015 readiness report");
    println!(
        "Answered {} of {} questions | {} / {} points ({}%)",
        sheet.len(),
        catalog.total_questions(),
        overall.score,
        overall.max_score,
        overall.percentage
    );
    println!("Readiness: {}", readiness.level);
    if !ignored.is_empty() {
        println!(
            "Ignored {} unknown question id(s): {}",
            ignored.len(),
            ignored.join(", ")
        );
    }
    println!("Report written to {}", output.display());

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        profile,
        email,
        company,
        report_dir,
    } = args;

    let delivery = DeliveryConfig {
        report_dir,
        ..DeliveryConfig::default()
    };
    let service = build_service(delivery, SessionLimits::default());
    let catalog = service.catalog();

    println!("ISO 9001:2015 readiness demo ({profile:?} profile)");
    let started = service.start()?;
    let id = started.value.assessment_id;
    println!("Assessment {id} started");

    for (chapter_index, chapter) in catalog.chapters().iter().enumerate() {
        for (question_index, question) in chapter.questions.iter().enumerate() {
            service.record_answer(
                &id,
                Answer {
                    question_id: question.id.to_string(),
                    value: profile.answer_for(chapter_index, question_index),
                    note: None,
                },
            )?;
        }
        if chapter_index + 1 < catalog.chapters().len() {
            service.navigate(&id, NavigationAction::NextChapter)?;
        }
    }

    let summary = service.navigate(&id, NavigationAction::NextChapter)?;
    print_summary(&summary.chapters);
    println!(
        "In-app readiness: {} ({}%)",
        summary.readiness.level, summary.overall.percentage
    );

    service.navigate(&id, NavigationAction::RequestReport)?;
    let completed = service.complete(
        &id,
        UserInfo {
            email,
            first_name: Some("Demo".to_string()),
            company,
        },
    )?;
    print_completion(&completed);

    Ok(())
}

fn print_summary(chapters: &[ChapterSummary]) {
    println!("\nChapter summary");
    for chapter in chapters {
        println!(
            "- {} {}: {}% ({}/{}) | {}",
            chapter.result.chapter_id,
            chapter.title,
            chapter.result.percentage,
            chapter.result.score,
            chapter.result.max_score,
            chapter.status
        );
    }
}

fn print_completion(completed: &CompletedAssessment) {
    let app_tier = APP_READINESS_POLICY.classify(completed.overall.percentage);
    println!("\nReport readiness: {}", completed.readiness.level);
    println!("  {}", completed.readiness.description);
    if app_tier.level != completed.readiness.level {
        println!(
            "  (the in-app summary labels the same score \"{}\")",
            app_tier.level
        );
    }

    let catalog = QuestionCatalog::iso9001();
    let results: Vec<_> = completed
        .snapshot
        .chapters
        .iter()
        .map(|chapter| chapter.result.clone())
        .collect();
    let chapters = report_chapters(catalog, &results);
    let recommendations = insights::recommendations(&chapters);
    if recommendations.is_empty() {
        println!("\n{}", insights::ALL_STRONG_MESSAGE);
    } else {
        println!("\nPriority recommendations");
        for recommendation in recommendations {
            println!(
                "- {} ({}%): {}",
                recommendation.title, recommendation.percentage, recommendation.action
            );
        }
    }

    match &completed.receipt {
        Some(receipt) => println!("\nReport emailed (message id {})", receipt.message_id),
        None => println!("\nReport email not sent"),
    }
    if let Some(path) = &completed.report_path {
        println!("Report written to {}", path.display());
    }
    if !completed.notices.is_empty() {
        println!("Delivery notices:");
        for notice in &completed.notices {
            println!("- {:?}: {}", notice.collaborator, notice.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_readiness::assessment::AssessmentId;

    #[test]
    fn profiles_answer_every_question() {
        let catalog = QuestionCatalog::iso9001();
        for profile in [DemoProfile::Strong, DemoProfile::Mixed, DemoProfile::Early] {
            let mut sheet = AnswerSheet::new();
            for (chapter_index, chapter) in catalog.chapters().iter().enumerate() {
                for (question_index, question) in chapter.questions.iter().enumerate() {
                    sheet.record(Answer {
                        question_id: question.id.to_string(),
                        value: profile.answer_for(chapter_index, question_index),
                        note: None,
                    });
                }
            }
            assert_eq!(sheet.len(), catalog.total_questions());
        }
    }

    #[test]
    fn strong_profile_outscores_early_profile() {
        let catalog = QuestionCatalog::iso9001();
        let score = |profile: DemoProfile| {
            let mut sheet = AnswerSheet::new();
            for (chapter_index, chapter) in catalog.chapters().iter().enumerate() {
                for (question_index, question) in chapter.questions.iter().enumerate() {
                    sheet.record(Answer {
                        question_id: question.id.to_string(),
                        value: profile.answer_for(chapter_index, question_index),
                        note: None,
                    });
                }
            }
            scoring::overall(&scoring::aggregate_all(catalog.chapters(), &sheet)).percentage
        };

        assert!(score(DemoProfile::Strong) >= 80);
        assert!(score(DemoProfile::Early) < 40);
    }

    #[test]
    fn report_command_writes_html() {
        let dir = std::env::temp_dir().join(format!("iso-report-{}", AssessmentId::generate()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let answers = dir.join("answers.json");
        let output = dir.join("report.html");
        std::fs::write(
            &answers,
            r#"{
                "user": { "email": "lead@example.com", "company": "Acme" },
                "answers": [
                    { "question_id": "4.1.1", "value": "yes" },
                    { "question_id": "4.1.2", "value": "partial" },
                    { "question_id": "99.9", "value": "no" }
                ]
            }"#,
        )
        .expect("answers written");

        run_report(ReportArgs {
            answers: answers.clone(),
            output: output.clone(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14),
            report_id: Some("CLI-1".to_string()),
        })
        .expect("report renders");

        let html = std::fs::read_to_string(&output).expect("report written");
        assert!(html.contains("<code>CLI-1</code>"));
        assert!(html.contains("March 14, 2026"));
        assert!(html.contains("Acme"));

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn report_command_rejects_malformed_answers() {
        let dir = std::env::temp_dir().join(format!("iso-report-{}", AssessmentId::generate()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let answers = dir.join("answers.json");
        std::fs::write(&answers, r#"{ "answers": [ { "question_id": "4.1.1", "value": "maybe" } ] }"#)
            .expect("answers written");

        let outcome = run_report(ReportArgs {
            answers,
            output: dir.join("report.html"),
            date: None,
            report_id: None,
        });
        assert!(matches!(outcome, Err(AppError::Input(_))));

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
