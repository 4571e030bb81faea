//! Device capability detection and responsive canvas sizing.

use crate::config::EditorConfig;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Horizontal padding per side on small viewports.
const SMALL_PADDING: f64 = 16.0;
/// Horizontal allowance for the side panel on large viewports.
const PANEL_ALLOWANCE: f64 = 360.0;
/// Vertical space taken by toolbars and headers.
const VERTICAL_CHROME: f64 = 160.0;

/// What the host reports about the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub touch: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl DeviceCapabilities {
    pub fn pointer(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            touch: false,
            viewport_width,
            viewport_height,
        }
    }

    pub fn touch(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            touch: true,
            viewport_width,
            viewport_height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportClass {
    Small,
    Large,
}

/// Which editor flavor to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorVariant {
    /// Gesture-enabled: pinch zoom, two-finger rotate.
    Touch,
    /// Mouse/trackpad: drag and wheel zoom.
    Pointer,
}

/// Product the design will be printed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    TShirt,
    Hoodie,
    Cap,
    ToteBag,
}

/// Print-area pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintArea {
    pub width: f64,
    pub height: f64,
}

impl PrintArea {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn for_product(product: ProductKind) -> Self {
        match product {
            ProductKind::TShirt => Self::new(720.0, 900.0),
            ProductKind::Hoodie => Self::new(720.0, 840.0),
            ProductKind::Cap => Self::new(600.0, 300.0),
            ProductKind::ToteBag => Self::new(700.0, 700.0),
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<ProductKind> for PrintArea {
    fn from(product: ProductKind) -> Self {
        Self::for_product(product)
    }
}

/// Result of capability detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub capabilities: DeviceCapabilities,
    pub class: ViewportClass,
    pub variant: EditorVariant,
    /// On-screen canvas size in CSS pixels.
    pub display_size: Size,
    /// On-screen pixels per print-area pixel.
    pub display_scale: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl DeviceProfile {
    pub fn compute(capabilities: DeviceCapabilities, print_area: PrintArea, config: &EditorConfig) -> Self {
        let class = if capabilities.viewport_width < config.small_viewport_width {
            ViewportClass::Small
        } else {
            ViewportClass::Large
        };
        let variant = if capabilities.touch && class == ViewportClass::Small {
            EditorVariant::Touch
        } else {
            EditorVariant::Pointer
        };
        let [min_zoom, max_zoom] = match variant {
            EditorVariant::Touch => config.touch_zoom_range,
            EditorVariant::Pointer => config.pointer_zoom_range,
        };

        let horizontal = match class {
            ViewportClass::Small => SMALL_PADDING * 2.0,
            ViewportClass::Large => PANEL_ALLOWANCE,
        };
        let available = Size::new(
            capabilities.viewport_width - horizontal,
            capabilities.viewport_height - VERTICAL_CHROME,
        );
        let display_scale = fit_scale(print_area, available);
        let display_size = Size::new(
            (print_area.width * display_scale).max(1.0),
            (print_area.height * display_scale).max(1.0),
        );

        Self {
            capabilities,
            class,
            variant,
            display_size,
            display_scale,
            min_zoom,
            max_zoom,
        }
    }

    pub fn is_touch(&self) -> bool {
        self.variant == EditorVariant::Touch
    }
}

/// Uniform scale fitting the print area inside `available`, never upscaled.
fn fit_scale(print_area: PrintArea, available: Size) -> f64 {
    if !print_area.is_valid() {
        return 1.0;
    }
    let scale = (available.width / print_area.width)
        .min(available.height / print_area.height)
        .min(1.0);
    // Keep at least one on-screen pixel in each direction
    let floor = (1.0 / print_area.width).max(1.0 / print_area.height);
    if scale.is_finite() { scale.max(floor) } else { floor }
}

/// Detection progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdapterState {
    /// Host should show a neutral placeholder.
    Detecting,
    Ready(DeviceProfile),
}

/// Chooses the editor variant and canvas size for the current device.
#[derive(Debug, Clone)]
pub struct DeviceAdapter {
    print_area: PrintArea,
    config: EditorConfig,
    state: AdapterState,
}

impl DeviceAdapter {
    pub fn new(print_area: PrintArea, config: EditorConfig) -> Self {
        Self {
            print_area,
            config,
            state: AdapterState::Detecting,
        }
    }

    pub fn state(&self) -> &AdapterState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, AdapterState::Ready(_))
    }

    pub fn profile(&self) -> Option<&DeviceProfile> {
        match &self.state {
            AdapterState::Ready(profile) => Some(profile),
            AdapterState::Detecting => None,
        }
    }

    pub fn print_area(&self) -> PrintArea {
        self.print_area
    }

    /// Finish detection with host-reported capabilities.
    pub fn detect(&mut self, capabilities: DeviceCapabilities) -> DeviceProfile {
        let profile = DeviceProfile::compute(capabilities, self.print_area, &self.config);
        log::info!(
            "Device detected: {:?} variant, {:?} viewport, display scale {:.3}",
            profile.variant,
            profile.class,
            profile.display_scale
        );
        self.state = AdapterState::Ready(profile);
        profile
    }

    /// Recompute after a viewport resize. Returns true if the variant changed.
    pub fn resize(&mut self, viewport_width: f64, viewport_height: f64) -> bool {
        let (touch, previous) = match &self.state {
            AdapterState::Ready(profile) => (profile.capabilities.touch, Some(profile.variant)),
            AdapterState::Detecting => (false, None),
        };
        let variant = self
            .detect(DeviceCapabilities {
                touch,
                viewport_width,
                viewport_height,
            })
            .variant;
        previous.is_some_and(|p| p != variant)
    }
}
