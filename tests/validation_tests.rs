mod common;

use common::fixtures::{basic_invoice, line_item, request_with_items};
use common::{generate, test_generator};
use facture::{DocumentKind, ErrorKind, Severity};

#[test]
fn every_violation_is_reported_at_once() {
    let mut request = basic_invoice();
    request.document_number = "  ".to_string();
    request.customer.name = String::new();
    request.items.clear();

    let record = generate(&request).unwrap_err();
    assert_eq!(record.kind, ErrorKind::DataValidation);
    assert_eq!(record.severity, Severity::Error);
    assert_eq!(record.context.get("violation_count").unwrap(), "3");
    assert!(record.detail.contains("document number"));
    assert!(record.detail.contains("customer name"));
    assert!(record.detail.contains("line item"));
}

#[test]
fn wrong_line_amount_is_rejected() {
    let mut request = basic_invoice();
    request.items[0].amount += 1.0;

    let record = generate(&request).unwrap_err();
    assert_eq!(record.kind, ErrorKind::DataValidation);
    assert!(record.detail.contains("item 1"));
}

#[test]
fn overridden_amounts_bypass_the_quantity_check() {
    let mut request = request_with_items(
        DocumentKind::Invoice,
        vec![line_item("consulting", "Retainer (flat fee)", 3.0, 10000.0)],
    );
    // Flat fee regardless of quantity.
    request.items[0].amount = 25000.0;
    request.items[0].amount_overridden = true;
    request.summary.subtotal = 25000.0;
    request.summary.tax = 2500.0;
    request.summary.total = 27500.0;

    assert!(generate(&request).is_ok());
}

#[test]
fn inconsistent_summary_total_is_rejected() {
    let mut request = basic_invoice();
    request.summary.total += 100.0;

    let record = generate(&request).unwrap_err();
    assert_eq!(record.kind, ErrorKind::DataValidation);
    assert!(record.detail.contains("subtotal + tax + adjustment"));
}

#[test]
fn missing_category_and_unit_require_positive_quantity() {
    let mut request = basic_invoice();
    request.items[0].category = None;
    request.items[0].unit = Some("  ".to_string());

    let record = generate(&request).unwrap_err();
    assert!(record.detail.contains("category is required"));
    assert!(record.detail.contains("unit is required"));

    // Zero-quantity rows are exempt from both checks.
    let mut request = basic_invoice();
    request.items[0].category = None;
    request.items[0].unit = None;
    request.items[0].quantity = 0.0;
    request.items[0].amount = 0.0;
    request.summary.subtotal -= 450000.0;
    request.summary.tax = (request.summary.subtotal * 0.1).round();
    request.summary.total = request.summary.subtotal + request.summary.tax;
    assert!(generate(&request).is_ok());
}

#[test]
fn failed_validation_leaves_the_generator_reusable() {
    let mut generator = test_generator();
    let mut bad = basic_invoice();
    bad.items.clear();
    assert!(generator.generate(&bad).is_err());

    let output = generator.generate(&basic_invoice()).unwrap();
    assert!(output.bytes.starts_with(b"%PDF"));
}
