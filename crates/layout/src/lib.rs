//! Split-pane geometry for the editor layout.
//!
//! The layout nests three resizable panes:
//!
//! ```text
//! root (100% wide)
//! ├── left                 X1% of root
//! └── main                 100 - X1%
//!     ├── top              100 - X2% of main height
//!     │   ├── editor       100 - X3% of top
//!     │   └── right        X3% of top
//!     └── bottom           X2% of main height
//! ```
//!
//! The percentages handed to the split-pane primitive are *nominal*: each is
//! relative to its parent. Only the right pane is nested inside a region whose
//! width already excludes another pane, so it is the only one whose nominal and
//! window percentages differ:
//!
//! ```text
//! right_window  = right_nominal · (100 − left) / 100
//! right_nominal = right_window · 100 / (100 − left)
//! ```
//!
//! [`ResizeLogic`] turns pixel constraints into nominal bounds, decides when the
//! side panels collapse, and returns corrected nominal widths that can be fed to
//! the layout unchanged.

pub mod convert;
mod resize;

use serde::{Deserialize, Serialize};

pub use resize::{ResizeLogic, ResizeOutcome, panels_should_collapse};

/// Fixed size settings of the layout.
pub mod size_settings {
	/// Widest the left panel may get.
	pub const LEFT_PANEL_MAX_WIDTH_PX: f64 = 400.0;
	/// Narrowest the left panel may get before collapsing.
	pub const LEFT_PANEL_MIN_WIDTH_PX: f64 = 180.0;
	/// Initial left panel width, as a window percentage.
	pub const LEFT_PANEL_DEFAULT_WIDTH_PERCENT: f64 = 15.0;
	/// Initial right panel width, as a window percentage.
	pub const RIGHT_PANEL_DEFAULT_WIDTH_PERCENT: f64 = 32.0;
	/// Initial bottom panel height, as a window percentage.
	pub const BOTTOM_PANEL_DEFAULT_HEIGHT_PERCENT: f64 = 20.0;
	/// Width reserved for the editor when deciding whether side panels fit.
	pub const COLLAPSE_EDITOR_RESERVE_PX: f64 = 560.0;
}

/// Pane sizes in percent. Nominal or window-relative depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaneSizes {
	pub left: f64,
	pub right: f64,
	pub bottom: f64,
}

impl PaneSizes {
	pub const fn new(left: f64, right: f64, bottom: f64) -> Self {
		Self { left, right, bottom }
	}

	/// Default sizes as window percentages.
	pub const fn default_window() -> Self {
		Self::new(
			size_settings::LEFT_PANEL_DEFAULT_WIDTH_PERCENT,
			size_settings::RIGHT_PANEL_DEFAULT_WIDTH_PERCENT,
			size_settings::BOTTOM_PANEL_DEFAULT_HEIGHT_PERCENT,
		)
	}

	/// Default sizes as nominal percentages.
	pub fn default_nominal() -> Self {
		convert::window_to_nominal(Self::default_window())
	}
}

/// Side panel widths in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaneSizesPixels {
	pub left_panel_width_px: f64,
	pub right_panel_width_px: f64,
	pub window_width_px: f64,
}

/// Inclusive pixel bounds of a panel width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthLimits {
	pub min: f64,
	pub max: f64,
}

impl WidthLimits {
	pub const fn new(min: f64, max: f64) -> Self {
		Self { min, max }
	}
}
