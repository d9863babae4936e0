use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::{Error, Result};

/// Symbolic padding mode understood by the IR consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
pub enum AutoPad {
    #[strum(serialize = "SAME")]
    Same,
    #[strum(serialize = "VALID")]
    Valid,
}

/// Extents of one spatial axis of a windowed operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisExtent {
    pub input: i64,
    pub output: i64,
    pub stride: i64,
    pub kernel: i64,
}

impl AxisExtent {
    fn is_same(&self) -> bool {
        self.output * self.stride == self.input
    }

    fn is_valid(&self) -> bool {
        self.output * self.stride == self.input - self.kernel + 1
    }
}

/// Infer the padding mode from the geometry of every spatial axis.
///
/// `SAME` when `output * stride == input` holds on all axes, `VALID` when
/// `output * stride == input - kernel + 1` holds on all axes, otherwise `None` and the
/// caller keeps explicit pads.
pub fn infer_auto_pad(axes: &[AxisExtent]) -> Option<AutoPad> {
    if axes.is_empty() {
        return None;
    }
    if axes.iter().all(AxisExtent::is_same) {
        Some(AutoPad::Same)
    } else if axes.iter().all(AxisExtent::is_valid) {
        Some(AutoPad::Valid)
    } else {
        None
    }
}

/// Per-dimension `[begin, end]` pairs for a channel-last 4D tensor with the same
/// amount of padding before and after each spatial axis.
pub fn symmetric_pads(padding_x: i64, padding_y: i64) -> [i64; 8] {
    [0, 0, padding_x, padding_y, padding_x, padding_y, 0, 0]
}

/// Reorder a flat list of `[begin, end]` pairs into `[begins..., ends...]`.
pub fn tf_pads_to_onnx(pads: &[i64]) -> Result<Vec<i64>> {
    if pads.len() % 2 != 0 {
        return Err(Error::ShapeMismatch(format!(
            "Pad list must hold begin/end pairs, got {} entries",
            pads.len()
        )));
    }

    let begins = pads.iter().step_by(2);
    let ends = pads.iter().skip(1).step_by(2);
    Ok(begins.chain(ends).copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(input: i64, output: i64, stride: i64, kernel: i64) -> AxisExtent {
        AxisExtent { input, output, stride, kernel }
    }

    #[test]
    fn test_same_padding() {
        let x = axis(4, 2, 2, 1);
        assert_eq!(infer_auto_pad(&[x, x]), Some(AutoPad::Same));
    }

    #[test]
    fn test_valid_padding_boundary() {
        // 2 * 1 == 4 - 3 + 1
        let x = axis(4, 2, 1, 3);
        assert_eq!(infer_auto_pad(&[x, x]), Some(AutoPad::Valid));
    }

    #[test]
    fn test_mixed_axes_infer_nothing() {
        let same = axis(4, 2, 2, 1);
        let valid = axis(4, 2, 1, 3);
        assert_eq!(infer_auto_pad(&[same, valid]), None);
        assert_eq!(infer_auto_pad(&[axis(7, 3, 2, 2), axis(7, 3, 2, 2)]), None);
    }

    #[test]
    fn test_pad_reordering() {
        let pads = symmetric_pads(1, 2);
        assert_eq!(pads, [0, 0, 1, 2, 1, 2, 0, 0]);
        assert_eq!(tf_pads_to_onnx(&pads).unwrap(), vec![0, 1, 1, 0, 0, 2, 2, 0]);
        assert!(tf_pads_to_onnx(&[0, 1, 2]).is_err());
    }

    #[test]
    fn test_auto_pad_tags() {
        assert_eq!(AutoPad::Same.to_string(), "SAME");
        assert_eq!(AutoPad::Valid.as_ref(), "VALID");
    }
}
