use lopdf::{Document as LopdfDocument, Object};

/// Extract all text content from a PDF document
pub fn extract_text(doc: &LopdfDocument) -> String {
    let mut text = String::new();
    let pages = doc.get_pages();
    for page_num in 1..=pages.len() {
        if let Ok(page_text) = doc.extract_text(&[page_num as u32]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }
    text
}

/// Base font names referenced anywhere in the document.
pub fn extract_font_names(doc: &LopdfDocument) -> Vec<String> {
    let mut fonts = Vec::new();
    for (_, object) in doc.objects.iter() {
        if let Ok(dict) = object.as_dict()
            && let Ok(type_val) = dict.get(b"Type")
            && let Ok(type_name) = type_val.as_name()
            && type_name == b"Font"
            && let Ok(base_font) = dict.get(b"BaseFont")
            && let Ok(font_name) = base_font.as_name()
        {
            fonts.push(String::from_utf8_lossy(font_name).to_string());
        }
    }
    fonts.sort();
    fonts.dedup();
    fonts
}

/// Whether the document embeds at least one image XObject.
pub fn has_image_xobject(doc: &LopdfDocument) -> bool {
    doc.objects.iter().any(|(_, object)| {
        let Object::Stream(stream) = object else {
            return false;
        };
        stream
            .dict
            .get(b"Subtype")
            .and_then(|v| v.as_name())
            .map(|name| name == b"Image")
            .unwrap_or(false)
    })
}

/// A string value from the trailer Info dictionary, e.g. `Title`.
pub fn info_string(doc: &LopdfDocument, key: &[u8]) -> Option<String> {
    let info_ref = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = doc.get_object(info_ref).ok()?.as_dict().ok()?;
    let value = info.get(key).ok()?;
    match value {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).to_string()),
        _ => None,
    }
}
