//! Render Module
//!
//! Surfaces and the compositors that paint on them. A surface is one of
//! a closed set of representations; compositors dispatch exhaustively so
//! a new representation cannot be added without revisiting every stage.

mod raster;
mod vector;

pub mod overlay;
pub mod style;

pub use raster::RasterSurface;
pub use vector::{fmt_num, VectorDocument};

// == Surface ==
/// A materialized drawing target for one output representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Mutable RGBA pixel buffer
    Raster(RasterSurface),
    /// Append-only SVG document
    Vector(VectorDocument),
}

impl Surface {
    /// Pixel width of the target.
    pub fn width(&self) -> u32 {
        match self {
            Surface::Raster(raster) => raster.width(),
            Surface::Vector(vector) => vector.width(),
        }
    }

    /// Pixel height of the target.
    pub fn height(&self) -> u32 {
        match self {
            Surface::Raster(raster) => raster.height(),
            Surface::Vector(vector) => vector.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_dimensions() {
        let raster = Surface::Raster(RasterSurface::new(64, 48));
        assert_eq!(raster.width(), 64);
        assert_eq!(raster.height(), 48);

        let vector = Surface::Vector(VectorDocument::new(200, 200));
        assert_eq!(vector.width(), 200);
        assert_eq!(vector.height(), 200);
    }
}
