use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use gradation::engine::MaterialKind;

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
            // First hue is cyan.
            let hue = 190.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.85, 0.45);
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
// Chart / table colours
// ---------------------------------------------------------------------------

pub const LIMIT_COLOR: Color32 = Color32::from_rgb(0x94, 0xa3, 0xb8);
pub const OUT_OF_LIMITS_COLOR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

/// Accent colour per material, used for its tab and its curve.
#[derive(Debug, Clone)]
pub struct MaterialColors {
    colors: Vec<Color32>,
}

impl Default for MaterialColors {
    fn default() -> Self {
        Self {
            colors: generate_palette(MaterialKind::ALL.len()),
        }
    }
}

impl MaterialColors {
    pub fn color_for(&self, kind: MaterialKind) -> Color32 {
        self.colors
            .get(kind as usize)
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(4).len(), 4);
    }

    #[test]
    fn materials_get_distinct_colors() {
        let colors = MaterialColors::default();
        let all: Vec<Color32> = MaterialKind::ALL.iter().map(|k| colors.color_for(*k)).collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
