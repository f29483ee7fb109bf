use facture::{
    DocumentKind, DocumentRequest, EmbeddedImage, FinancialSummary, IssuerProfile, LineItem, Party,
};

/// One billable line with a consistent amount.
pub fn line_item(category: &str, description: &str, quantity: f64, unit_price: f64) -> LineItem {
    LineItem {
        category: Some(category.to_string()),
        description: description.to_string(),
        quantity,
        unit: Some("unit".to_string()),
        unit_price,
        amount: (quantity * unit_price).round(),
        amount_overridden: false,
    }
}

/// A valid request with a recomputed financial summary.
pub fn request_with_items(kind: DocumentKind, items: Vec<LineItem>) -> DocumentRequest {
    let subtotal: f64 = items.iter().map(|item| item.amount).sum();
    let tax = (subtotal * 0.1).round();
    DocumentRequest {
        document_number: match kind {
            DocumentKind::Estimate => "EST-2026-001".to_string(),
            DocumentKind::Invoice => "INV-2026-001".to_string(),
        },
        kind,
        issue_date: "2026-08-01".to_string(),
        due_date: Some("2026-08-31".to_string()),
        issuer: IssuerProfile {
            name: "Meridian Design Studio".to_string(),
            address: "12 Harbor Lane, Portsmouth".to_string(),
            contact: "billing@meridian.example".to_string(),
            bank_details: "IBAN XX00 1234 5678".to_string(),
            logo: None,
            seal: None,
        },
        customer: Party {
            name: "Globex Corporation".to_string(),
            address: "100 Industrial Way".to_string(),
        },
        items,
        summary: FinancialSummary {
            subtotal,
            tax_rate: 0.1,
            tax,
            adjustment: 0.0,
            total: subtotal + tax,
        },
        notes: None,
    }
}

pub fn basic_invoice() -> DocumentRequest {
    request_with_items(
        DocumentKind::Invoice,
        vec![
            line_item("design", "Site design", 1.0, 450000.0),
            line_item("development", "Implementation", 1.0, 525000.0),
            line_item("consulting", "Deployment support", 1.0, 150000.0),
        ],
    )
}

pub fn long_invoice(item_count: usize) -> DocumentRequest {
    let items = (0..item_count)
        .map(|i| line_item("development", &format!("Work package {i}"), 1.0, 10000.0))
        .collect();
    request_with_items(DocumentKind::Invoice, items)
}

/// A small valid PNG produced through the `image` crate.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 0x80])
    });
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("in-memory png encode");
    buffer.into_inner()
}

pub fn invoice_with_logo(logo_bytes: Vec<u8>) -> DocumentRequest {
    let mut request = basic_invoice();
    request.issuer.logo = Some(EmbeddedImage {
        name: "logo.png".to_string(),
        bytes: logo_bytes,
    });
    request
}
