//! Page geometry: boxes, rotation, and the placement matrix.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in PDF user space (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle, normalizing the corners so that `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::from_size(612.0, 792.0)
    }

    /// ISO A4 (210 x 297 mm).
    pub fn a4() -> Self {
        Self::from_size(595.0, 842.0)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Intersection of two rectangles, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

/// Page rotation as stored in `/Rotate` (clockwise, multiples of 90).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    /// Normalize a `/Rotate` value. Values that are not multiples of 90 are
    /// treated as no rotation.
    pub fn from_degrees(degrees: i64) -> Self {
        if degrees % 90 != 0 {
            return Rotation::None;
        }
        match degrees.rem_euclid(360) {
            90 => Rotation::Clockwise90,
            180 => Rotation::Clockwise180,
            270 => Rotation::Clockwise270,
            _ => Rotation::None,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Whether width and height swap when the page is displayed.
    pub fn is_sideways(&self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Affine transform `[a b c d e f]` as used by the `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Add a translation after this transform.
    pub fn then_translate(mut self, tx: f32, ty: f32) -> Matrix {
        self.e += tx;
        self.f += ty;
        self
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Render as `cm` operands.
    pub fn to_operands(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            fmt_num(self.a),
            fmt_num(self.b),
            fmt_num(self.c),
            fmt_num(self.d),
            fmt_num(self.e),
            fmt_num(self.f)
        )
    }
}

/// Shortest decimal form without exponent, as PDF content streams require.
fn fmt_num(v: f32) -> String {
    if v == v.trunc() && v.abs() < 1e9 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Geometry of a single page, with inherited attributes already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Effective `/MediaBox`
    pub media_box: Rect,

    /// Effective `/CropBox`, if any
    pub crop_box: Option<Rect>,

    /// Effective `/Rotate`
    pub rotation: Rotation,
}

impl PageGeometry {
    pub fn new(media_box: Rect) -> Self {
        Self {
            media_box,
            crop_box: None,
            rotation: Rotation::None,
        }
    }

    pub fn with_crop_box(mut self, crop_box: Rect) -> Self {
        self.crop_box = Some(crop_box);
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// The region a viewer shows: CropBox clipped to MediaBox.
    ///
    /// A CropBox that falls entirely outside the MediaBox is ignored.
    pub fn visible_box(&self) -> Rect {
        self.crop_box
            .and_then(|crop| crop.intersect(&self.media_box))
            .unwrap_or(self.media_box)
    }

    /// Displayed width in points, after rotation.
    pub fn width(&self) -> f32 {
        let b = self.visible_box();
        if self.rotation.is_sideways() {
            b.height()
        } else {
            b.width()
        }
    }

    /// Displayed height in points, after rotation.
    pub fn height(&self) -> f32 {
        let b = self.visible_box();
        if self.rotation.is_sideways() {
            b.width()
        } else {
            b.height()
        }
    }

    /// Transform from page user space to an upright space whose origin is
    /// the lower-left corner of the displayed page.
    pub fn display_matrix(&self) -> Matrix {
        let Rect { x0, y0, x1, y1 } = self.visible_box();
        match self.rotation {
            Rotation::None => Matrix::IDENTITY.then_translate(-x0, -y0),
            Rotation::Clockwise90 => Matrix {
                a: 0.0,
                b: -1.0,
                c: 1.0,
                d: 0.0,
                e: -y0,
                f: x1,
            },
            Rotation::Clockwise180 => Matrix {
                a: -1.0,
                b: 0.0,
                c: 0.0,
                d: -1.0,
                e: x1,
                f: y1,
            },
            Rotation::Clockwise270 => Matrix {
                a: 0.0,
                b: 1.0,
                c: -1.0,
                d: 0.0,
                e: y1,
                f: -x0,
            },
        }
    }
}
