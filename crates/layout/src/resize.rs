use crate::convert::{left_window_to_nominal, right_window_to_nominal};
use crate::size_settings::{COLLAPSE_EDITOR_RESERVE_PX, LEFT_PANEL_MAX_WIDTH_PX, LEFT_PANEL_MIN_WIDTH_PX};
use crate::{PaneSizes, WidthLimits};

/// Returns true if the window is too narrow to show both side panels.
///
/// Strict: a window exactly `560 + left min + right min` wide keeps its panels.
pub fn panels_should_collapse(window_width_px: f64, right_min_width_px: f64) -> bool {
	window_width_px < COLLAPSE_EDITOR_RESERVE_PX + LEFT_PANEL_MIN_WIDTH_PX + right_min_width_px
}

/// `min(max(x, lo), hi)`; unlike [`f64::clamp`] it does not panic when `lo > hi`.
fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
	x.max(lo).min(hi)
}

/// Everything the layout needs for one set of nominal sizes.
///
/// All percentages are nominal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
	pub left_min_width_percent: f64,
	pub left_max_width_percent: f64,
	pub right_min_width_percent: f64,
	pub right_max_width_percent: f64,
	pub left_panel_should_collapse: bool,
	pub right_panel_should_collapse: bool,
	pub all_panels_should_collapse: bool,
	/// Left width after collapse and clamping.
	pub left_corrected_width_percent: f64,
	/// Right width after collapse and clamping.
	pub right_corrected_width_percent: f64,
}

/// Resize rules for a window of known width.
///
/// Bounds depend on the window width, so call [`ResizeLogic::set_window_width`]
/// whenever the window resizes and resolve again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeLogic {
	right_limits_px: WidthLimits,
	window_width_px: f64,
}

impl ResizeLogic {
	pub fn new(right_limits_px: WidthLimits, window_width_px: f64) -> Self {
		Self {
			right_limits_px,
			window_width_px,
		}
	}

	pub fn window_width(&self) -> f64 {
		self.window_width_px
	}

	pub fn set_window_width(&mut self, window_width_px: f64) {
		self.window_width_px = window_width_px;
	}

	pub fn right_limits(&self) -> WidthLimits {
		self.right_limits_px
	}

	fn px_to_window_percent(&self, px: f64) -> f64 {
		100.0 * (px / self.window_width_px)
	}

	pub fn left_min_width_percent(&self) -> f64 {
		left_window_to_nominal(self.px_to_window_percent(LEFT_PANEL_MIN_WIDTH_PX))
	}

	pub fn left_max_width_percent(&self) -> f64 {
		left_window_to_nominal(self.px_to_window_percent(LEFT_PANEL_MAX_WIDTH_PX))
	}

	/// Right bounds are nominal, so they depend on the current left width.
	pub fn right_min_width_percent(&self, nominal: &PaneSizes) -> f64 {
		right_window_to_nominal(self.px_to_window_percent(self.right_limits_px.min), nominal.left)
	}

	pub fn right_max_width_percent(&self, nominal: &PaneSizes) -> f64 {
		right_window_to_nominal(self.px_to_window_percent(self.right_limits_px.max), nominal.left)
	}

	pub fn left_panel_should_collapse(&self) -> bool {
		panels_should_collapse(self.window_width_px, self.right_limits_px.min)
	}

	pub fn right_panel_should_collapse(&self) -> bool {
		panels_should_collapse(self.window_width_px, self.right_limits_px.min)
	}

	pub fn all_panels_should_collapse(&self) -> bool {
		self.left_panel_should_collapse() && self.right_panel_should_collapse()
	}

	pub fn resolve(&self, nominal: PaneSizes) -> ResizeOutcome {
		let left_min = self.left_min_width_percent();
		let left_max = self.left_max_width_percent();
		let right_min = self.right_min_width_percent(&nominal);
		let right_max = self.right_max_width_percent(&nominal);
		let left_collapse = self.left_panel_should_collapse();
		let right_collapse = self.right_panel_should_collapse();
		let all_collapse = self.all_panels_should_collapse();

		let left_corrected = if left_collapse || all_collapse {
			0.0
		} else {
			clamp(nominal.left, left_min, left_max)
		};
		let right_corrected = if right_collapse || all_collapse {
			0.0
		} else {
			clamp(nominal.right, right_min, right_max)
		};

		ResizeOutcome {
			left_min_width_percent: left_min,
			left_max_width_percent: left_max,
			right_min_width_percent: right_min,
			right_max_width_percent: right_max,
			left_panel_should_collapse: left_collapse,
			right_panel_should_collapse: right_collapse,
			all_panels_should_collapse: all_collapse,
			left_corrected_width_percent: left_corrected,
			right_corrected_width_percent: right_corrected,
		}
	}
}
