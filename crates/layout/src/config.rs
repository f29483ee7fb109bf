use facture_types::Size;

/// Page geometry in PDF points. Defaults to A4 portrait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page: Size,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page: Size::new(595.0, 842.0),
            margin_top: 48.0,
            margin_right: 40.0,
            margin_bottom: 48.0,
            margin_left: 40.0,
        }
    }
}

impl PageGeometry {
    /// Width available for content between the horizontal margins.
    pub fn content_width(&self) -> f32 {
        self.page.width - self.margin_left - self.margin_right
    }

    /// Height available for content between the vertical margins.
    pub fn content_height(&self) -> f32 {
        self.page.height - self.margin_top - self.margin_bottom
    }
}
