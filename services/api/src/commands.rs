use crate::infra::{document_generator, parse_field, ConsoleNotifier};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use uncif_docs::config::AppConfig;
use uncif_docs::error::AppError;
use uncif_docs::workflows::documents::{
    Delivery, DeliveryReceipt, DocumentCatalog, DocumentKind, ExportControl, ExportFormat,
    ExportPipeline, FieldKind, FileSystemSink, FormData,
};
use uncif_docs::workflows::fees::{
    ApplicantCategory, FeeCalculator, FeeQuote, PageCount, ProjectType,
};
use uncif_docs::workflows::grants::{GrantDirectory, GrantPage, GrantQuery, GrantStatus};

#[derive(Args, Debug)]
pub(crate) struct FeeQuoteArgs {
    /// Number of pages to document (at least 1)
    #[arg(long)]
    pub(crate) pages: u32,
    /// Applicant category: regular, student, financial-aid or founder
    #[arg(long)]
    pub(crate) category: String,
    /// Project type: business-portfolio (default) or ecommerce-ai
    #[arg(long)]
    pub(crate) project_type: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DocumentExportArgs {
    /// Document kind, e.g. letter, invoice, fee-statement
    #[arg(long)]
    pub(crate) kind: String,
    /// Output format: pdf, png, jpg or doc
    #[arg(long, default_value = "pdf")]
    pub(crate) format: String,
    /// Form field as key=value; repeat for each field
    #[arg(long = "field", value_parser = parse_field)]
    pub(crate) fields: Vec<(String, String)>,
    /// Directory for the artifact (defaults to UNCIF_EXPORT_DIR)
    #[arg(long)]
    pub(crate) out_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GrantListArgs {
    /// Case-insensitive text matched against title and focus area
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Exact focus area, e.g. Education
    #[arg(long)]
    pub(crate) focus_area: Option<String>,
    /// Hide closed grants
    #[arg(long)]
    pub(crate) open_only: bool,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    #[arg(long, default_value_t = 6)]
    pub(crate) per_page: usize,
}

pub(crate) fn run_fee_quote(args: FeeQuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let category = args.category.parse::<ApplicantCategory>()?;
    let project_type = args
        .project_type
        .as_deref()
        .map(str::parse::<ProjectType>)
        .transpose()?
        .unwrap_or_default();
    let pages = PageCount::new(args.pages)?;

    let quote = FeeCalculator::new(config.fees).quote(pages, category, project_type);
    render_fee_quote(&quote);
    Ok(())
}

pub(crate) fn render_fee_quote(quote: &FeeQuote) {
    println!(
        "Fee quote: {} pages | {} | {}",
        quote.page_count,
        quote.category.label(),
        quote.project_type.label()
    );
    println!("- Editing fee:          {}", quote.editing_fee);
    println!("- Documentation fee:    {}", quote.documentation_fee);
    println!("- Applicant pays:       {}", quote.applicant_total);
    println!("- Covered by UNCIF:     {}", quote.subsidized());
    println!("- Application fee:      {} (charged separately)", quote.application_fee);
}

pub(crate) fn run_documents_list() -> Result<(), AppError> {
    let catalog = DocumentCatalog::standard();
    for template in catalog.templates() {
        let formats: Vec<String> = template.formats.iter().map(ToString::to_string).collect();
        println!(
            "{:<15} {} [{}]",
            template.kind.slug(),
            template.title,
            formats.join(", ")
        );
        for field in &template.fields {
            let kind = match field.kind {
                FieldKind::Text => "text".to_string(),
                FieldKind::Multiline => "multiline".to_string(),
                FieldKind::Date => "date YYYY-MM-DD".to_string(),
                FieldKind::Number => "number".to_string(),
                FieldKind::Choice(options) => format!("one of {}", options.join("|")),
            };
            let required = if field.required { "" } else { ", optional" };
            println!("    {:<22} {} ({kind}{required})", field.key, field.label);
        }
    }
    Ok(())
}

pub(crate) fn run_documents_export(args: DocumentExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let kind = args.kind.parse::<DocumentKind>()?;
    let format = args.format.parse::<ExportFormat>()?;
    let form: FormData = args.fields.into_iter().collect();
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.export.output_dir.clone());

    let pipeline = ExportPipeline::new(
        document_generator(&config),
        &config.export,
        Arc::new(FileSystemSink::new(out_dir)),
        Arc::new(ConsoleNotifier),
    );
    let control = ExportControl::new();
    let now = Utc::now();
    let job = pipeline.job(kind, format, form, now);
    let receipt = pipeline.run(&control, job, now.date_naive())?;
    print_receipt(&receipt);
    Ok(())
}

pub(crate) fn print_receipt(receipt: &DeliveryReceipt) {
    match &receipt.delivery {
        Delivery::Written(path) => {
            let content_type = mime_guess::from_path(path).first_or_octet_stream();
            println!(
                "Saved {} ({content_type}, {} bytes)",
                path.display(),
                receipt.size
            );
        }
        Delivery::Download(artifact) => println!(
            "Prepared {} ({}, {} bytes)",
            artifact.file_name, artifact.content_type, receipt.size
        ),
    }
}

pub(crate) fn run_grants_list(args: GrantListArgs) -> Result<(), AppError> {
    let directory = GrantDirectory::embedded()?;
    let page = directory.search(&GrantQuery {
        search: args.search,
        focus_area: args.focus_area,
        open_only: args.open_only,
        page: args.page,
        per_page: args.per_page,
    });
    render_grant_page(&page);
    Ok(())
}

pub(crate) fn render_grant_page(page: &GrantPage) {
    println!(
        "Grants: {} match(es), page {} of {}",
        page.total, page.page, page.total_pages
    );
    for grant in &page.items {
        let status = match grant.status {
            GrantStatus::Open => "open",
            GrantStatus::Closed => "closed",
        };
        println!(
            "- {} {} | {} | {} | up to {} | deadline {} ({status})",
            grant.id, grant.title, grant.focus_area, grant.region, grant.max_award, grant.deadline
        );
    }
}
