//! Request validation and normalization.
//!
//! Validation aggregates every violation instead of stopping at the first,
//! so the caller can surface a complete list to the user. A clean request
//! is normalized into the immutable [`DocumentModel`] the rest of the
//! pipeline operates on.

use crate::error::{ValidationIssue, ValidationRule};
use facture_types::model::{category_color, DocumentModel, ModelItem};
use facture_types::money::round_amount;
use facture_types::{DocumentRequest, IssuerProfile, Party};

const SUMMARY_EPSILON: f64 = 0.01;

/// Validates a request, returning the normalized model or every violation
/// found.
pub fn validate(request: &DocumentRequest) -> Result<DocumentModel, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if request.document_number.trim().is_empty() {
        issues.push(ValidationIssue {
            rule: ValidationRule::EmptyDocumentNumber,
            message: "document number must not be empty".to_string(),
        });
    }
    if request.customer.name.trim().is_empty() {
        issues.push(ValidationIssue {
            rule: ValidationRule::EmptyCustomerName,
            message: "customer name must not be empty".to_string(),
        });
    }
    if request.items.is_empty() {
        issues.push(ValidationIssue {
            rule: ValidationRule::EmptyItems,
            message: "at least one line item is required".to_string(),
        });
    }

    for (index, item) in request.items.iter().enumerate() {
        let row = index + 1;
        if item.quantity > 0.0 {
            if item.category.as_deref().unwrap_or("").trim().is_empty() {
                issues.push(ValidationIssue {
                    rule: ValidationRule::MissingCategory,
                    message: format!("item {row}: category is required when quantity > 0"),
                });
            }
            if item.unit.as_deref().unwrap_or("").trim().is_empty() {
                issues.push(ValidationIssue {
                    rule: ValidationRule::MissingUnit,
                    message: format!("item {row}: unit is required when quantity > 0"),
                });
            }
        }
        if !item.amount_overridden {
            let expected = round_amount(item.quantity * item.unit_price);
            if (item.amount - expected).abs() > SUMMARY_EPSILON {
                issues.push(ValidationIssue {
                    rule: ValidationRule::AmountMismatch,
                    message: format!(
                        "item {row}: amount {} does not equal quantity x unit price ({expected})",
                        item.amount
                    ),
                });
            }
        }
    }

    let summary = &request.summary;
    let declared = summary.subtotal + summary.tax + summary.adjustment;
    if (summary.total - declared).abs() > SUMMARY_EPSILON {
        issues.push(ValidationIssue {
            rule: ValidationRule::SummaryMismatch,
            message: format!(
                "declared total {} does not equal subtotal + tax + adjustment ({declared})",
                summary.total
            ),
        });
    }

    if !issues.is_empty() {
        return Err(issues);
    }
    Ok(normalize(request))
}

fn normalize(request: &DocumentRequest) -> DocumentModel {
    let items = request
        .items
        .iter()
        .map(|item| {
            let category = item
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            let color = category
                .as_deref()
                .map(category_color)
                .unwrap_or(facture_types::model::DEFAULT_CATEGORY_COLOR);
            ModelItem {
                category_color: color,
                category,
                description: item.description.trim().to_string(),
                quantity: item.quantity,
                unit: item
                    .unit
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(str::to_string),
                unit_price: item.unit_price,
                amount: item.amount,
            }
        })
        .collect();

    DocumentModel {
        document_number: request.document_number.trim().to_string(),
        kind: request.kind,
        issue_date: request.issue_date.trim().to_string(),
        due_date: request
            .due_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        issuer: IssuerProfile {
            name: request.issuer.name.trim().to_string(),
            address: request.issuer.address.trim().to_string(),
            contact: request.issuer.contact.trim().to_string(),
            bank_details: request.issuer.bank_details.trim().to_string(),
            logo: request.issuer.logo.clone(),
            seal: request.issuer.seal.clone(),
        },
        customer: Party {
            name: request.customer.name.trim().to_string(),
            address: request.customer.address.trim().to_string(),
        },
        items,
        summary: request.summary,
        notes: request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    }
}
