//! Map visualization derivations.
//!
//! Pure helpers shared by the sync extraction (which bakes the values into
//! the snapshot) and the map routes (which derive them for city rollups on
//! the fly). Band thresholds follow the frontend's legend.

use serde::{Deserialize, Serialize};

/// Marker diameter band by revenue.
pub fn marker_size(revenue: f64) -> &'static str {
    if revenue > 1_000_000.0 {
        "xl"
    } else if revenue > 500_000.0 {
        "large"
    } else if revenue > 100_000.0 {
        "medium"
    } else {
        "small"
    }
}

/// Marker color band by profit margin percent.
pub fn marker_color(profit_margin: f64) -> &'static str {
    if profit_margin < 20.0 {
        "#cc0000"
    } else if profit_margin < 40.0 {
        "#ff6600"
    } else if profit_margin < 50.0 {
        "#ffcc00"
    } else {
        "#00aa00"
    }
}

/// Normalized line strength in `[0, 1]`.
pub fn strength(volume: f64, max_volume: f64) -> f64 {
    if max_volume <= 0.0 {
        return 0.0;
    }
    (volume / max_volume).min(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineViz {
    pub line_width: i64,
    pub line_color: String,
    pub opacity: f64,
}

/// Width/color/opacity for a connection line of the given strength.
pub fn line_visualization(strength: f64) -> LineViz {
    let width = ((strength * 12.0).ceil() as i64).max(2);
    let opacity = 0.4 + strength * 0.6;
    let color = if strength < 0.3 {
        "#cccccc"
    } else if strength < 0.6 {
        "#ffcc00"
    } else {
        "#ff6600"
    };
    LineViz {
        line_width: width,
        line_color: color.to_string(),
        opacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_size_bands() {
        assert_eq!(marker_size(2_000_000.0), "xl");
        assert_eq!(marker_size(600_000.0), "large");
        assert_eq!(marker_size(150_000.0), "medium");
        assert_eq!(marker_size(99_000.0), "small");
    }

    #[test]
    fn marker_color_bands() {
        assert_eq!(marker_color(10.0), "#cc0000");
        assert_eq!(marker_color(25.0), "#ff6600");
        assert_eq!(marker_color(45.0), "#ffcc00");
        assert_eq!(marker_color(60.0), "#00aa00");
    }

    #[test]
    fn strength_caps_at_one() {
        assert_eq!(strength(20.0, 10.0), 1.0);
        assert_eq!(strength(5.0, 10.0), 0.5);
        assert_eq!(strength(5.0, 0.0), 0.0);
    }

    #[test]
    fn line_width_floor_is_two() {
        let viz = line_visualization(0.0);
        assert_eq!(viz.line_width, 2);
        assert_eq!(viz.line_color, "#cccccc");
        assert!((viz.opacity - 0.4).abs() < 1e-9);

        let strong = line_visualization(1.0);
        assert_eq!(strong.line_width, 12);
        assert_eq!(strong.line_color, "#ff6600");
    }
}
