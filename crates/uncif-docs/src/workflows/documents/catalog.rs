use serde::Serialize;

use super::domain::{DocumentKind, ExportFormat, FieldKind, FieldSpec};

const IMAGE_AND_PDF: &[ExportFormat] = &[ExportFormat::Pdf, ExportFormat::Png, ExportFormat::Jpg];
const CATEGORY_CHOICES: &[&str] = &["regular", "student", "financial-aid", "founder"];
const PROJECT_CHOICES: &[&str] = &["business-portfolio", "ecommerce-ai"];
const RATING_CHOICES: &[&str] = &["1", "2", "3", "4", "5"];

/// Declarative description of one fillable document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentTemplate {
    pub kind: DocumentKind,
    pub title: &'static str,
    /// Document segment of exported file names.
    pub file_stem: &'static str,
    pub fields: Vec<FieldSpec>,
    /// Paragraphs with `{field_key}` placeholders.
    pub body: Vec<&'static str>,
    pub closing: &'static str,
    pub formats: &'static [ExportFormat],
    pub carries_fee_quote: bool,
}

impl DocumentTemplate {
    pub fn supports(&self, format: ExportFormat) -> bool {
        self.formats.contains(&format)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentCatalog {
    templates: Vec<DocumentTemplate>,
}

impl DocumentCatalog {
    pub fn standard() -> Self {
        Self {
            templates: standard_templates(),
        }
    }

    pub fn from_templates(templates: Vec<DocumentTemplate>) -> Self {
        Self { templates }
    }

    pub fn template(&self, kind: DocumentKind) -> Option<&DocumentTemplate> {
        self.templates.iter().find(|template| template.kind == kind)
    }

    pub fn templates(&self) -> &[DocumentTemplate] {
        &self.templates
    }
}

impl Default for DocumentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

const fn text(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind: FieldKind::Text,
        required: true,
    }
}

const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required: false,
    }
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required: true,
    }
}

fn standard_templates() -> Vec<DocumentTemplate> {
    vec![
        DocumentTemplate {
            kind: DocumentKind::Agreement,
            title: "Memorandum of Agreement",
            file_stem: "Agreement",
            fields: vec![
                text("party_name", "Partner organization"),
                text("party_representative", "Authorized representative"),
                field("effective_date", "Effective date", FieldKind::Date),
                field("term_months", "Term (months)", FieldKind::Number),
                field("scope", "Scope of cooperation", FieldKind::Multiline),
                optional("witness", "Witness", FieldKind::Text),
            ],
            body: vec![
                "This memorandum records the agreement between UNCIF and {party_name}, represented by {party_representative}, effective {effective_date}.",
                "The parties will cooperate on the following scope for a term of {term_months} months: {scope}",
                "Either party may end this agreement with thirty days written notice. Obligations already incurred survive termination.",
            ],
            closing: "Signed on behalf of UNCIF and {party_name}.",
            formats: ExportFormat::ALL,
            carries_fee_quote: false,
        },
        DocumentTemplate {
            kind: DocumentKind::Clearance,
            title: "Clearance Certificate",
            file_stem: "Clearance",
            fields: vec![
                text("holder_name", "Name of holder"),
                text("designation", "Designation"),
                field("relieved_on", "Relieved on", FieldKind::Date),
                optional("remarks", "Remarks", FieldKind::Multiline),
            ],
            body: vec![
                "This is to certify that {holder_name}, {designation}, has returned all UNCIF property and settled all dues as of {relieved_on}.",
                "No claims are pending against the holder in any UNCIF office. {remarks}",
            ],
            closing: "Issued for official use on request of the holder.",
            formats: ExportFormat::ALL,
            carries_fee_quote: false,
        },
        DocumentTemplate {
            kind: DocumentKind::Letter,
            title: "Letter of Recommendation",
            file_stem: "Letter",
            fields: vec![
                text("recipient_name", "Recipient"),
                text("recipient_role", "Role held"),
                text("program", "Program"),
                field("letter_date", "Letter date", FieldKind::Date),
                field("highlights", "Highlights", FieldKind::Multiline),
                text("signatory", "Signatory"),
            ],
            body: vec![
                "To whom it may concern,",
                "{recipient_name} served UNCIF as {recipient_role} in the {program} program. {highlights}",
                "We recommend {recipient_name} without reservation and are glad to answer further queries.",
            ],
            closing: "{signatory}, UNCIF",
            formats: ExportFormat::ALL,
            carries_fee_quote: false,
        },
        DocumentTemplate {
            kind: DocumentKind::Rating,
            title: "Performance Rating",
            file_stem: "Rating",
            fields: vec![
                text("member_name", "Member"),
                text("review_period", "Review period"),
                field("rating", "Rating (1-5)", FieldKind::Choice(RATING_CHOICES)),
                field("assessment", "Assessment", FieldKind::Multiline),
                text("reviewer", "Reviewer"),
            ],
            body: vec![
                "Rating for {member_name} covering {review_period}: {rating} out of 5.",
                "{assessment}",
            ],
            closing: "Reviewed by {reviewer}.",
            formats: IMAGE_AND_PDF,
            carries_fee_quote: false,
        },
        DocumentTemplate {
            kind: DocumentKind::Invoice,
            title: "Invoice",
            file_stem: "Invoice",
            fields: vec![
                text("invoice_number", "Invoice number"),
                text("bill_to", "Bill to"),
                field("invoice_date", "Invoice date", FieldKind::Date),
                text("description", "Description"),
                field("amount", "Amount (INR)", FieldKind::Number),
                optional("due_date", "Due date", FieldKind::Date),
            ],
            body: vec![
                "Invoice {invoice_number} issued to {bill_to} on {invoice_date}.",
                "Payable for: {description}.",
            ],
            closing: "Please quote the invoice number with your payment.",
            formats: ExportFormat::ALL,
            carries_fee_quote: false,
        },
        DocumentTemplate {
            kind: DocumentKind::Collaboration,
            title: "Collaboration Letter",
            file_stem: "Collaboration",
            fields: vec![
                text("partner_name", "Partner"),
                text("initiative", "Initiative"),
                field("start_date", "Start date", FieldKind::Date),
                field("contributions", "Contributions", FieldKind::Multiline),
                text("contact_person", "Contact person"),
            ],
            body: vec![
                "UNCIF is pleased to confirm its collaboration with {partner_name} on {initiative}, starting {start_date}.",
                "Agreed contributions: {contributions}",
                "{contact_person} will coordinate the collaboration for UNCIF.",
            ],
            closing: "With warm regards, UNCIF Partnerships",
            formats: ExportFormat::ALL,
            carries_fee_quote: false,
        },
        DocumentTemplate {
            kind: DocumentKind::Certificate,
            title: "Certificate of Appreciation",
            file_stem: "Certificate",
            fields: vec![
                text("awardee_name", "Awardee"),
                text("achievement", "Achievement"),
                field("awarded_on", "Awarded on", FieldKind::Date),
                text("signatory", "Signatory"),
            ],
            body: vec![
                "Presented to {awardee_name}",
                "in appreciation of {achievement}.",
            ],
            closing: "{signatory}, UNCIF, {awarded_on}",
            formats: IMAGE_AND_PDF,
            carries_fee_quote: false,
        },
        DocumentTemplate {
            kind: DocumentKind::FeeStatement,
            title: "Documentation Fee Statement",
            file_stem: "FeeStatement",
            fields: vec![
                text("applicant_name", "Applicant"),
                text("project_title", "Project title"),
                field("page_count", "Number of pages", FieldKind::Number),
                field("category", "Applicant category", FieldKind::Choice(CATEGORY_CHOICES)),
                field("project_type", "Project type", FieldKind::Choice(PROJECT_CHOICES)),
            ],
            body: vec![
                "Fee statement for {applicant_name} covering documentation of {project_title} ({page_count} pages).",
                "UNCIF covers the remaining share of the service fees. The application fee is charged separately.",
            ],
            closing: "Amounts are quoted in Indian rupees.",
            formats: ExportFormat::ALL,
            carries_fee_quote: true,
        },
    ]
}
