use chrono::NaiveDate;
use serde::Serialize;

use super::catalog::{DocumentCatalog, DocumentTemplate};
use super::domain::{DocumentKind, FieldKind, FormData};
use crate::workflows::fees::{
    ApplicantCategory, FeeCalculator, FeeQuote, PageCount, ProjectType,
};
use crate::workflows::validation::ValidationError;

/// Labeled field value as shown beneath the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewField {
    pub label: &'static str,
    pub value: String,
}

/// Structured, fully substituted document ready for layout or display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentPreview {
    pub kind: DocumentKind,
    pub organization: String,
    pub title: &'static str,
    pub reference: String,
    pub issued_on: NaiveDate,
    pub paragraphs: Vec<String>,
    pub fields: Vec<PreviewField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_quote: Option<FeeQuote>,
    pub closing: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no template registered for {0}")]
    UnknownTemplate(DocumentKind),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Shared engine behind every form-plus-preview document page.
#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    catalog: DocumentCatalog,
    calculator: FeeCalculator,
    organization: String,
}

impl DocumentGenerator {
    pub fn new(catalog: DocumentCatalog, calculator: FeeCalculator, organization: &str) -> Self {
        Self {
            catalog,
            calculator,
            organization: organization.to_string(),
        }
    }

    pub fn catalog(&self) -> &DocumentCatalog {
        &self.catalog
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn template(&self, kind: DocumentKind) -> Result<&DocumentTemplate, GenerateError> {
        self.catalog
            .template(kind)
            .ok_or(GenerateError::UnknownTemplate(kind))
    }

    /// Check required fields and typed values; returns the fee quote when the template carries one.
    pub fn validate(
        &self,
        template: &DocumentTemplate,
        form: &FormData,
    ) -> Result<Option<FeeQuote>, ValidationError> {
        for field in &template.fields {
            let Some(value) = form.get(field.key) else {
                if field.required {
                    return Err(ValidationError::missing(field.key));
                }
                continue;
            };

            let length = value.chars().count();
            if length > field.kind.max_chars() {
                return Err(ValidationError::TooLong {
                    field: field.key.to_string(),
                    max: field.kind.max_chars(),
                    found: length,
                });
            }

            match field.kind {
                FieldKind::Text | FieldKind::Multiline => {}
                FieldKind::Number => {
                    value
                        .parse::<u64>()
                        .map_err(|_| ValidationError::InvalidNumber {
                            field: field.key.to_string(),
                            value: value.to_string(),
                        })?;
                }
                FieldKind::Date => {
                    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                        ValidationError::InvalidDate {
                            field: field.key.to_string(),
                            value: value.to_string(),
                        }
                    })?;
                }
                FieldKind::Choice(options) => {
                    if !options.iter().any(|option| option.eq_ignore_ascii_case(value)) {
                        return Err(ValidationError::InvalidChoice {
                            field: field.key.to_string(),
                            value: value.to_string(),
                            allowed: options.join(", "),
                        });
                    }
                }
            }
        }

        if template.carries_fee_quote {
            self.fee_quote(form).map(Some)
        } else {
            Ok(None)
        }
    }

    fn fee_quote(&self, form: &FormData) -> Result<FeeQuote, ValidationError> {
        let raw_pages = form
            .get("page_count")
            .ok_or_else(|| ValidationError::missing("page_count"))?;
        let pages = raw_pages
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidNumber {
                field: "page_count".to_string(),
                value: raw_pages.to_string(),
            })?;

        let max = self.calculator.schedule().max_page_count;
        if pages == 0 || pages > max {
            return Err(ValidationError::PageCountOutOfRange {
                min: 1,
                max,
                found: pages,
            });
        }

        let category = form
            .get("category")
            .ok_or_else(|| ValidationError::missing("category"))?
            .parse::<ApplicantCategory>()?;
        let project_type = form
            .get("project_type")
            .map(|value| value.parse::<ProjectType>())
            .transpose()?
            .unwrap_or_default();

        Ok(self
            .calculator
            .quote(PageCount::new(pages)?, category, project_type))
    }

    /// Render the preview a user sees next to the form.
    pub fn preview(
        &self,
        kind: DocumentKind,
        form: &FormData,
        issued_on: NaiveDate,
    ) -> Result<DocumentPreview, GenerateError> {
        let template = self.template(kind)?;
        let fee_quote = self.validate(template, form)?;

        let paragraphs = template
            .body
            .iter()
            .map(|paragraph| fill_placeholders(paragraph, form))
            .filter(|paragraph| !paragraph.is_empty())
            .collect();

        let fields = template
            .fields
            .iter()
            .filter_map(|field| {
                form.get(field.key).map(|value| PreviewField {
                    label: field.label,
                    value: value.to_string(),
                })
            })
            .collect();

        Ok(DocumentPreview {
            kind,
            organization: self.organization.clone(),
            title: template.title,
            reference: self.reference(kind, issued_on),
            issued_on,
            paragraphs,
            fields,
            fee_quote,
            closing: fill_placeholders(template.closing, form),
        })
    }

    pub fn reference(&self, kind: DocumentKind, issued_on: NaiveDate) -> String {
        format!(
            "{}/{}/{}",
            self.organization,
            kind.code(),
            issued_on.format("%Y%m%d")
        )
    }

    /// Flat `Label: value` text for the word-processor stand-in; skips layout entirely.
    pub fn text_stub(
        &self,
        kind: DocumentKind,
        form: &FormData,
        issued_on: NaiveDate,
    ) -> Result<String, GenerateError> {
        let template = self.template(kind)?;
        let fee_quote = self.validate(template, form)?;

        let mut lines = vec![
            format!("{} {}", self.organization, template.title),
            format!("Reference: {}", self.reference(kind, issued_on)),
            format!("Date: {}", issued_on.format("%Y-%m-%d")),
            String::new(),
        ];

        for field in &template.fields {
            let value = form.get(field.key).unwrap_or("-");
            lines.push(format!("{}: {}", field.label, value));
        }

        if let Some(quote) = fee_quote {
            lines.push(String::new());
            lines.push(format!("Editing fee: {}", quote.editing_fee));
            lines.push(format!("Documentation fee: {}", quote.documentation_fee));
            lines.push(format!("Applicant pays: {}", quote.applicant_total));
            lines.push(format!("Application fee: {}", quote.application_fee));
        }

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }
}

/// Replace `{key}` tokens with form values; unknown or blank keys become empty.
pub(crate) fn fill_placeholders(template: &str, form: &FormData) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                output.push_str(form.get(&after[..end]).unwrap_or(""));
                rest = &after[end + 1..];
            }
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);

    output.split_whitespace().collect::<Vec<_>>().join(" ")
}
