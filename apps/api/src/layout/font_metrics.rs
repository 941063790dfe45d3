//! Static font-metric tables for the Arial/Helvetica face both templates use.
//!
//! Character widths are in em units (relative to font size), taken from the standard
//! Helvetica AFM files. Arial is metric-compatible, so layout measured here matches what
//! the browser preview produced. The rasterizer may draw with a different TrueType face;
//! wrapping is always decided by these tables so layout stays deterministic.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

pub const MM_PER_INCH: f32 = 25.4;
pub const CSS_DPI: f32 = 96.0;

/// Physical page geometry plus the layout surface derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// A4 paper width.
    pub page_width_mm: f32,
    /// A4 paper height; the PDF media box.
    pub paper_height_mm: f32,
    /// Height of the band shown per page when slicing a tall raster.
    pub page_height_mm: f32,
}

impl PageConfig {
    /// Width of the layout surface in CSS px.
    pub fn surface_width_px(&self) -> f32 {
        mm_to_px(self.page_width_mm)
    }

    /// Minimum surface height so a short document still fills one page band.
    pub fn min_surface_height_px(&self) -> f32 {
        mm_to_px(self.page_height_mm)
    }
}

/// A4 with the 295 mm slicing band.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width_mm: 210.0,
        paper_height_mm: 297.0,
        page_height_mm: 295.0,
    }
}

pub fn mm_to_px(mm: f32) -> f32 {
    mm / MM_PER_INCH * CSS_DPI
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one weight.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub weight: FontWeight,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of a string in px at the given font size.
    pub fn measure_px(&self, s: &str, size_px: f32) -> f32 {
        self.measure_str(s) * size_px
    }
}

/// Returns the metric table for a weight.
pub fn get_metrics(weight: FontWeight) -> &'static FontMetricTable {
    match weight {
        FontWeight::Regular => &HELVETICA_TABLE,
        FontWeight::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    weight: FontWeight::Regular,
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    weight: FontWeight::Bold,
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_known_widths() {
        let regular = get_metrics(FontWeight::Regular);
        // "Hi" = H (0.722) + i (0.222)
        assert!((regular.measure_str("Hi") - 0.944).abs() < 1e-4);
        assert!((regular.measure_px("Hi", 10.0) - 9.44).abs() < 1e-3);
    }

    #[test]
    fn test_bold_is_never_narrower() {
        let regular = get_metrics(FontWeight::Regular);
        let bold = get_metrics(FontWeight::Bold);
        let sample = "The quick brown fox jumps over the lazy dog 0123456789";
        assert!(bold.measure_str(sample) >= regular.measure_str(sample));
    }

    #[test]
    fn test_non_ascii_uses_average() {
        let regular = get_metrics(FontWeight::Regular);
        assert!((regular.measure_str("é") - regular.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_a4_surface_width() {
        let config = default_page_config();
        // 210 mm at 96 dpi ≈ 793.7 px
        assert!((config.surface_width_px() - 793.7).abs() < 0.1);
        assert!(config.min_surface_height_px() > config.surface_width_px());
    }
}
