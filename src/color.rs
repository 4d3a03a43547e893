use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Bar and line colour (`#0083B8`).
pub const ACCENT: Color32 = Color32::from_rgb(0x00, 0x83, 0xB8);
/// Mean sales reference line.
pub const MEAN_SALES: Color32 = Color32::from_rgb(220, 50, 50);
/// Mean profit ratio reference line.
pub const MEAN_RATIO: Color32 = Color32::from_rgb(40, 160, 70);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: sub-category → Color32
// ---------------------------------------------------------------------------

/// Stable colours for a set of labels (sub-categories in the scatter legend).
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign palette colours to labels in ascending label order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = labels.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();

        let palette = generate_palette(names.len());
        let mapping = names.into_iter().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: ACCENT,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}
