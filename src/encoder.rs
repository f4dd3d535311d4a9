//! Base Encoder Module
//!
//! Boundary to the external QR matrix encoder. The encoder is treated as
//! a trusted pure function from payload + error tolerance to a boolean
//! module matrix; failures here are terminal for the request.

use qirust::qrcode::{EncodeTextOptions, QrCode, QrCodeEcc, Version};

use crate::error::{GenerateError, Result};
use crate::models::ErrorTolerance;

// == Module Matrix ==
/// The raw boolean module grid produced by the encoder, before styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: u32,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Edge length in modules.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whether the module at `(x, y)` is set. Out-of-range coordinates
    /// are unset, matching the quiet zone.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.size as i64 || y >= self.size as i64 {
            return false;
        }
        self.modules[(y as u32 * self.size + x as u32) as usize]
    }

    /// Whether `(x, y)` lies inside one of the three finder patterns.
    pub fn in_finder_pattern(&self, x: u32, y: u32) -> bool {
        let s = self.size;
        (x < 7 && y < 7) || (x >= s.saturating_sub(7) && y < 7) || (x < 7 && y >= s.saturating_sub(7))
    }
}

// == Encode ==
/// Encodes a payload into a module matrix at the given error tolerance.
///
/// The borrowed encoder output is copied into owned storage so the matrix
/// can outlive the encoder's scratch buffers.
pub fn encode(payload: &str, tolerance: ErrorTolerance) -> Result<ModuleMatrix> {
    let mut outbuffer = vec![0u8; Version::MAX.buffer_len()];
    let mut tempbuffer = vec![0u8; Version::MAX.buffer_len()];

    let qr = QrCode::encode_text(
        payload,
        &mut tempbuffer,
        &mut outbuffer,
        EncodeTextOptions {
            ecl: ecc_for(tolerance),
            minversion: Version::MIN,
            maxversion: Version::MAX,
            mask: None,
            boostecl: true,
        },
    )
    .map_err(|e| GenerateError::Encoding(e.to_string()))?;

    let size = qr.size() as u32;
    let mut modules = Vec::with_capacity((size * size) as usize);
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            modules.push(qr.get_module(x, y));
        }
    }

    Ok(ModuleMatrix { size, modules })
}

/// Maps the pipeline's tolerance level onto the encoder's levels.
fn ecc_for(tolerance: ErrorTolerance) -> QrCodeEcc {
    match tolerance {
        ErrorTolerance::Low => QrCodeEcc::Low,
        ErrorTolerance::Medium => QrCodeEcc::Medium,
        ErrorTolerance::Quartile => QrCodeEcc::Quartile,
        ErrorTolerance::High => QrCodeEcc::High,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_small_payload() {
        let matrix = encode("HELLO WORLD", ErrorTolerance::Medium).unwrap();

        // Smallest symbols are 21 modules; size is always odd
        assert!(matrix.size() >= 21);
        assert_eq!(matrix.size() % 2, 1);
    }

    #[test]
    fn test_encode_deterministic() {
        let a = encode("HELLO", ErrorTolerance::Low).unwrap();
        let b = encode("HELLO", ErrorTolerance::Low).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_out_of_range_is_unset() {
        let matrix = encode("HELLO", ErrorTolerance::Low).unwrap();
        assert!(!matrix.get(-1, 0));
        assert!(!matrix.get(0, -1));
        assert!(!matrix.get(matrix.size() as i64, 0));
    }

    #[test]
    fn test_encode_finder_corner_is_set() {
        // Every symbol starts with a finder pattern whose outer ring is set
        let matrix = encode("HELLO", ErrorTolerance::Low).unwrap();
        assert!(matrix.get(0, 0));
        assert!(matrix.in_finder_pattern(0, 0));
        assert!(matrix.in_finder_pattern(matrix.size() - 1, 0));
        assert!(matrix.in_finder_pattern(0, matrix.size() - 1));
        assert!(!matrix.in_finder_pattern(matrix.size() / 2, matrix.size() / 2));
    }

    #[test]
    fn test_encode_over_capacity_fails() {
        // Far beyond the ~3 KB capacity of the largest symbol
        let oversized = "x".repeat(5000);
        let result = encode(&oversized, ErrorTolerance::High);
        assert!(result.is_err());
    }

    #[test]
    fn test_tolerance_levels_accepted() {
        for tolerance in [
            ErrorTolerance::Low,
            ErrorTolerance::Medium,
            ErrorTolerance::Quartile,
            ErrorTolerance::High,
        ] {
            assert!(encode("TOLERANCE", tolerance).is_ok());
        }
    }
}
