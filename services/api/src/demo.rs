use crate::commands::{print_receipt, render_fee_quote, render_grant_page};
use crate::infra::{document_generator, ConsoleNotifier, InMemorySubmissionRepository};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use uncif_docs::config::AppConfig;
use uncif_docs::error::AppError;
use uncif_docs::workflows::documents::{
    DocumentKind, ExportControl, ExportError, ExportFormat, ExportPipeline, FileSystemSink,
    FormData,
};
use uncif_docs::workflows::fees::{
    ApplicantCategory, FeeCalculator, PageCount, ProjectType, Rupees,
};
use uncif_docs::workflows::grants::{GrantDirectory, GrantQuery};
use uncif_docs::workflows::submissions::{
    DonationForm, GrantApplicationForm, SubmissionService, SubmissionServiceError,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory for demo artifacts (defaults to UNCIF_EXPORT_DIR/demo)
    #[arg(long)]
    pub(crate) out_dir: Option<PathBuf>,
    /// Skip writing document artifacts.
    #[arg(long)]
    pub(crate) skip_exports: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let calculator = Arc::new(FeeCalculator::new(config.fees.clone()));

    println!("UNCIF document services demo");
    println!();
    for (pages, category) in [(3, ApplicantCategory::Regular), (5, ApplicantCategory::Student)] {
        let quote = calculator.quote(PageCount::new(pages)?, category, ProjectType::default());
        render_fee_quote(&quote);
        println!();
    }

    if !args.skip_exports {
        let out_dir = args
            .out_dir
            .unwrap_or_else(|| config.export.output_dir.join("demo"));
        println!("Exports ({})", out_dir.display());
        let pipeline = ExportPipeline::new(
            document_generator(&config),
            &config.export,
            Arc::new(FileSystemSink::new(out_dir)),
            Arc::new(ConsoleNotifier),
        );
        let control = ExportControl::new();
        for (kind, format, form) in demo_exports() {
            let now = Utc::now();
            let job = pipeline.job(kind, format, form, now);
            match pipeline.run(&control, job, now.date_naive()) {
                Ok(receipt) => print_receipt(&receipt),
                // The notifier already told the user; keep going with the rest.
                Err(ExportError::Unsupported { .. }) => {}
                Err(other) => return Err(other.into()),
            }
        }
        println!();
    }

    let submissions = SubmissionService::new(
        Arc::new(InMemorySubmissionRepository::default()),
        Arc::clone(&calculator),
    );
    println!("Submissions");
    let donation = submissions
        .submit_donation(DonationForm {
            donor_name: "Anita Desai".to_string(),
            email: "anita@example.org".to_string(),
            amount: Rupees(2_500),
            message: Some("For the mobile library.".to_string()),
            recurring: true,
        })
        .map_err(demo_submission_error)?;
    println!("- {} {}", donation.id, donation.payload.summary());

    let application = submissions
        .apply_for_grant(GrantApplicationForm {
            applicant_name: "Kabir Shah".to_string(),
            email: "kabir@example.org".to_string(),
            project_title: "Village Market App".to_string(),
            project_type: ProjectType::EcommerceAi,
            category: ApplicantCategory::Student,
            page_count: 5,
            summary: "Marketplace connecting farmers with nearby buyers.".to_string(),
        })
        .map_err(demo_submission_error)?;
    println!("- {} {}", application.id, application.payload.summary());
    if let Some(quote) = &application.fee_quote {
        println!(
            "  applicant pays {} of {} in service fees",
            quote.applicant_total,
            quote.service_fees()
        );
    }
    println!();

    let directory = GrantDirectory::embedded()?;
    render_grant_page(&directory.search(&GrantQuery {
        open_only: true,
        ..GrantQuery::default()
    }));

    Ok(())
}

/// Demo inputs are fixed, so a rejection means the bundled sample data is wrong.
fn demo_submission_error(error: SubmissionServiceError) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("demo submission rejected: {error}"),
    ))
}

fn demo_exports() -> Vec<(DocumentKind, ExportFormat, FormData)> {
    let letter = FormData::new()
        .with("recipient_name", "Meera Iyer")
        .with("recipient_role", "Field Coordinator")
        .with("program", "Rural Literacy")
        .with("letter_date", "2025-03-14")
        .with(
            "highlights",
            "She trained forty volunteers across six districts and set up twelve reading circles.",
        )
        .with("signatory", "R. Banerjee");
    let certificate = FormData::new()
        .with("awardee_name", "Farah Khan")
        .with("achievement", "ten years of volunteer teaching")
        .with("awarded_on", "2025-03-01")
        .with("signatory", "A. Menon");
    let fee_statement = FormData::new()
        .with("applicant_name", "Kabir Shah")
        .with("project_title", "Village Market App")
        .with("page_count", "5")
        .with("category", "student")
        .with("project_type", "ecommerce-ai");

    vec![
        (DocumentKind::Letter, ExportFormat::Pdf, letter.clone()),
        (DocumentKind::Letter, ExportFormat::Doc, letter),
        (DocumentKind::Certificate, ExportFormat::Png, certificate.clone()),
        (DocumentKind::Certificate, ExportFormat::Doc, certificate),
        (DocumentKind::FeeStatement, ExportFormat::Pdf, fee_statement.clone()),
        (DocumentKind::FeeStatement, ExportFormat::Jpg, fee_statement),
    ]
}
