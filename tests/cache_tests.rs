mod common;

use common::fixtures::basic_invoice;
use common::test_generator;
use facture::pipeline::builder::UniformFontMeasurer;
use facture::{DocumentKind, GeneratorBuilder};
use std::sync::Arc;

#[test]
fn repeated_requests_are_served_from_the_cache() {
    let mut generator = test_generator();
    let first = generator.generate(&basic_invoice()).unwrap();
    let second = generator.generate(&basic_invoice()).unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert!(Arc::ptr_eq(&first.bytes, &second.bytes));
    assert_eq!(second.report.cache.hit_count, 1);
    assert_eq!(second.report.cache.entry_count, 1);
}

#[test]
fn interior_whitespace_differences_do_not_bust_the_cache() {
    let mut generator = test_generator();
    let first = generator.generate(&basic_invoice()).unwrap();

    let mut spaced = basic_invoice();
    spaced.items[0].description = "Site   design".to_string();
    spaced.customer.name = "Globex  Corporation".to_string();
    let second = generator.generate(&spaced).unwrap();

    assert!(second.cache_hit);
    assert!(Arc::ptr_eq(&first.bytes, &second.bytes));
}

#[test]
fn content_changes_produce_fresh_output() {
    let mut generator = test_generator();
    let first = generator.generate(&basic_invoice()).unwrap();

    let mut changed = basic_invoice();
    changed.kind = DocumentKind::Estimate;
    let second = generator.generate(&changed).unwrap();

    assert!(!second.cache_hit);
    assert!(!Arc::ptr_eq(&first.bytes, &second.bytes));
}

#[test]
fn documents_over_the_byte_budget_are_not_retained() {
    common::init_test_logging();
    let mut generator = GeneratorBuilder::new()
        .with_font_measurer(Arc::new(UniformFontMeasurer))
        .with_cache_budget(64)
        .build();

    let first = generator.generate(&basic_invoice()).unwrap();
    assert!(first.bytes.len() > 64);
    let second = generator.generate(&basic_invoice()).unwrap();

    assert!(!second.cache_hit);
    assert_eq!(generator.cache_stats().entry_count, 0);
}

#[test]
fn clearing_the_cache_forces_a_rerender() {
    let mut generator = test_generator();
    let first = generator.generate(&basic_invoice()).unwrap();
    let freed = generator.clear_cache();
    assert!(freed >= first.bytes.len());

    let second = generator.generate(&basic_invoice()).unwrap();
    assert!(!second.cache_hit);
    assert_eq!(second.report.page_count, 1);
}
