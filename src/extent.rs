use std::fmt;

use ash::vk;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Extent3d {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent3d {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub const fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0 && self.depth == 0
    }
}

impl From<vk::Extent3D> for Extent3d {
    fn from(extent: vk::Extent3D) -> Self {
        Self::new(extent.width, extent.height, extent.depth)
    }
}

/// Formats as `(width height depth)`.
impl fmt::Display for Extent3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.width, self.height, self.depth)
    }
}
