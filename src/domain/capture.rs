//! Capture requests and page geometry

use serde::{Deserialize, Serialize};

use super::geometry::CssRect;

/// What part of the page to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Visible,
    FullPage,
    Area,
    Element,
}

impl std::str::FromStr for CaptureMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visible" => Ok(CaptureMode::Visible),
            "fullpage" | "full-page" => Ok(CaptureMode::FullPage),
            "area" => Ok(CaptureMode::Area),
            "element" => Ok(CaptureMode::Element),
            _ => anyhow::bail!("unknown capture mode {s:?}"),
        }
    }
}

/// One user-initiated capture, consumed once by the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    pub mode: CaptureMode,
    /// Selection or element bounds in CSS pixels (area and element modes)
    pub target: Option<CssRect>,
    pub dpr: f32,
}

/// Page and viewport extents in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl PageGeometry {
    /// Build from the several layout-box extents a page reports
    ///
    /// Pages disagree about which accessor holds the real scroll extent, so the
    /// maximum of each set is used.
    pub fn from_candidates(
        widths: &[f32],
        heights: &[f32],
        viewport_width: f32,
        viewport_height: f32,
    ) -> Self {
        let max = |values: &[f32]| values.iter().copied().fold(0.0_f32, f32::max);
        Self {
            page_width: max(widths),
            page_height: max(heights),
            viewport_width,
            viewport_height,
        }
    }
}

/// Derived layout of a full-page capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StitchPlan {
    pub geometry: PageGeometry,
    pub dpr: f32,
    pub step_count: u32,
    /// Final bitmap size in device pixels
    pub output_width: u32,
    pub output_height: u32,
    /// Size of one viewport capture in device pixels
    pub slice_width: u32,
    pub slice_height: u32,
}

impl StitchPlan {
    /// Returns `None` for a zero-sized page or viewport
    pub fn new(geometry: PageGeometry, dpr: f32) -> Option<Self> {
        let PageGeometry {
            page_width,
            page_height,
            viewport_width,
            viewport_height,
        } = geometry;
        if !(page_width > 0.0 && page_height > 0.0 && viewport_width > 0.0 && viewport_height > 0.0)
            || dpr <= 0.0
        {
            return None;
        }
        let step_count = ((page_height / viewport_height).ceil() as u32).max(1);
        Some(Self {
            geometry,
            dpr,
            step_count,
            output_width: to_device(page_width, dpr),
            output_height: to_device(page_height, dpr),
            slice_width: to_device(viewport_width, dpr),
            slice_height: to_device(viewport_height, dpr),
        })
    }

    /// Scroll offset (CSS px) requested for step `i`
    pub fn scroll_offset(&self, step: u32) -> f32 {
        step as f32 * self.geometry.viewport_height
    }
}

fn to_device(css: f32, dpr: f32) -> u32 {
    (css * dpr).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(page_h: f32, viewport_h: f32) -> PageGeometry {
        PageGeometry {
            page_width: 800.0,
            page_height: page_h,
            viewport_width: 800.0,
            viewport_height: viewport_h,
        }
    }

    #[test]
    fn test_step_count_is_ceil() {
        let cases = [
            (3000.0, 1000.0, 3),
            (3001.0, 1000.0, 4),
            (999.0, 1000.0, 1),
            (1000.0, 1000.0, 1),
            (1.0, 7.0, 1),
        ];
        for (page_h, viewport_h, steps) in cases {
            let plan = StitchPlan::new(geometry(page_h, viewport_h), 1.0).unwrap();
            assert_eq!(plan.step_count, steps, "page {page_h} viewport {viewport_h}");
        }
    }

    #[test]
    fn test_output_size_scales_with_dpr() {
        let plan = StitchPlan::new(geometry(2500.0, 1000.0), 2.0).unwrap();
        assert_eq!(plan.output_height, 5000);
        assert_eq!(plan.output_width, 1600);
        assert_eq!(plan.slice_height, 2000);
        assert_eq!(plan.scroll_offset(2), 2000.0);
    }

    #[test]
    fn test_degenerate_geometry_has_no_plan() {
        assert!(StitchPlan::new(geometry(0.0, 1000.0), 1.0).is_none());
        assert!(StitchPlan::new(geometry(100.0, 0.0), 1.0).is_none());
        assert!(StitchPlan::new(geometry(100.0, 100.0), 0.0).is_none());
    }

    #[test]
    fn test_geometry_from_candidates_takes_max() {
        let g = PageGeometry::from_candidates(&[800.0, 1024.0, 0.0], &[600.0, 4200.0], 1024.0, 700.0);
        assert_eq!(g.page_width, 1024.0);
        assert_eq!(g.page_height, 4200.0);
    }

    #[test]
    fn test_capture_mode_parse() {
        assert_eq!("fullpage".parse::<CaptureMode>().unwrap(), CaptureMode::FullPage);
        assert!("window".parse::<CaptureMode>().is_err());
    }
}
