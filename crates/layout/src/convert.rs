//! Conversions between nominal percentages, window percentages and pixels.

use crate::{PaneSizes, PaneSizesPixels};

/// Right pane: nominal percentage to window percentage.
pub fn right_nominal_to_window(right: f64, left: f64) -> f64 {
	right * ((100.0 - left) / 100.0)
}

/// Right pane: window percentage to nominal percentage.
///
/// Not finite when `left` is 100.
pub fn right_window_to_nominal(right: f64, left: f64) -> f64 {
	right * (100.0 / (100.0 - left))
}

/// Left pane: the left pane is not nested, so this is the identity.
pub fn left_nominal_to_window(left: f64) -> f64 {
	left
}

/// Left pane: identity, see [`left_nominal_to_window`].
pub fn left_window_to_nominal(left: f64) -> f64 {
	left
}

pub fn nominal_to_window(nominal: PaneSizes) -> PaneSizes {
	PaneSizes {
		right: right_nominal_to_window(nominal.right, nominal.left),
		..nominal
	}
}

pub fn window_to_nominal(window: PaneSizes) -> PaneSizes {
	PaneSizes {
		right: right_window_to_nominal(window.right, window.left),
		..window
	}
}

/// Side panel widths in pixels for a window `window_width_px` wide.
pub fn window_to_pixels(window: PaneSizes, window_width_px: f64) -> PaneSizesPixels {
	PaneSizesPixels {
		left_panel_width_px: window.left * window_width_px / 100.0,
		right_panel_width_px: window.right * window_width_px / 100.0,
		window_width_px,
	}
}
