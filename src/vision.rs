//! Vision capability interface
//!
//! Face detection, eye detection, and optical-flow estimation are external
//! capabilities: the aggregation core only consumes their per-frame result.
//! Backends implement [`VisionPrimitive`]; the engine is unit-testable with
//! deterministic fakes.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Single-channel (luma) frame as handed to a vision backend.
///
/// Decoding raw camera formats into luma is the caller's responsibility; this
/// type only guards the buffer/dimension contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumaFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl LumaFrame {
    /// Create a frame, rejecting buffers that do not match the dimensions
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EngineError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(EngineError::InvalidFrame(format!(
                "luma buffer length {} does not match {}x{} ({} expected)",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Face bounding box in pixel coordinates, with the eye-detector count for
/// the upper half of the box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Eyes detected in the upper half of the face region
    pub eye_count: u32,
}

impl FaceBox {
    /// Center of the bounding box
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Per-frame result produced by a vision backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Detected face, if any
    pub face: Option<FaceBox>,
    /// Mean optical-flow magnitude between the previous and current frame.
    /// Backends report 0.0 when no previous frame exists.
    pub flow_magnitude: f64,
}

/// Injected vision capability.
///
/// Implementations are expected to be CPU-bound and blocking; callers that
/// serve multiple sessions should dispatch `analyze` off their request path.
pub trait VisionPrimitive: Send + Sync {
    /// Analyze one frame against the previous frame of the same session
    fn analyze(
        &self,
        prev: Option<&LumaFrame>,
        frame: &LumaFrame,
    ) -> Result<FrameAnalysis, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dimension_contract() {
        assert!(LumaFrame::new(4, 4, vec![0u8; 16]).is_ok());

        let err = LumaFrame::new(4, 4, vec![0u8; 15]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidFrame(_)));
    }

    #[test]
    fn test_face_center() {
        let face = FaceBox {
            x: 10.0,
            y: 20.0,
            width: 40.0,
            height: 60.0,
            eye_count: 2,
        };
        assert_eq!(face.center(), (30.0, 50.0));
    }
}
