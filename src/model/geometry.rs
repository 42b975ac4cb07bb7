use serde::{Deserialize, Serialize};

use super::{CoreError, Result};

/// Intrinsic pixel dimensions of a loaded slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaturalSize {
    pub width: f64,
    pub height: f64,
}

impl NaturalSize {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(CoreError::InvalidNaturalSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn from_pixels(width: u32, height: u32) -> Result<Self> {
        Self::new(f64::from(width), f64::from(height))
    }

    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Observed size of the rendering surface. Zero while not laid out.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned region in natural-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        let finite = [x, y, width, height].iter().all(|value| value.is_finite());
        if !finite || width < 0.0 || height < 0.0 {
            return Err(CoreError::InvalidRegion(format!(
                "x={x}, y={y}, width={width}, height={height}"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn centered_on(center: Point, size: f64) -> Self {
        Self {
            x: center.x - size * 0.5,
            y: center.y - size * 0.5,
            width: size,
            height: size,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Render-time rectangle in display pixels, relative to the viewport origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}
