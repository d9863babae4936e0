use std::fmt;

use crate::error::{Error, Result};

/// Axis permutation taking a `[outputchannel, inputchannel, height, width]` kernel
/// to `[height, width, inputchannel, outputchannel]`.
pub const OIHW_TO_HWIO: [usize; 4] = [2, 3, 1, 0];

/// Shape and strides of a dense tensor.
/// Used to validate reshapes and axis permutations before touching tensor data.
#[derive(Clone, PartialEq, Eq)]
pub struct TensorLayout {
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl TensorLayout {
    /// Create a standard contiguous (row-major) layout for the given shape.
    pub fn contiguous_layout(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: Self::compute_contiguous_strides(shape),
        }
    }

    /// Create a transposed layout by permuting dimensions according to the given axes.
    pub fn transposed_layout(layout: &TensorLayout, axes: &[usize]) -> Result<Self> {
        if axes.len() != layout.shape.len() {
            return Err(Error::ShapeMismatch(format!(
                "Transpose axes must have the same length as tensor rank. Got {} axes for rank {}",
                axes.len(),
                layout.shape.len()
            )));
        }

        let mut seen = vec![false; axes.len()];
        for &axis in axes {
            if axis >= layout.shape.len() {
                return Err(Error::ShapeMismatch(format!(
                    "Transpose axis {} out of bounds for tensor of rank {}",
                    axis,
                    layout.shape.len()
                )));
            }
            if seen[axis] {
                return Err(Error::ShapeMismatch(format!(
                    "Duplicate axis {} in transpose axes",
                    axis
                )));
            }
            seen[axis] = true;
        }

        let shape = axes.iter().map(|&axis| layout.shape[axis]).collect();
        let strides = axes.iter().map(|&axis| layout.strides[axis]).collect();

        Ok(Self { shape, strides })
    }

    /// Layout of the same elements viewed with a new shape.
    /// The element count must be preserved.
    pub fn reshaped_layout(layout: &TensorLayout, shape: &[usize]) -> Result<Self> {
        let target: usize = shape.iter().product();
        if target != layout.size() {
            return Err(Error::ShapeMismatch(format!(
                "Cannot reshape tensor from {:?} to {:?}: total elements don't match",
                layout.shape, shape
            )));
        }
        Ok(Self::contiguous_layout(shape))
    }

    /// Row-major strides, e.g. `[2, 3, 4]` gives `[12, 4, 1]`.
    fn compute_contiguous_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![1; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    /// Check if this layout is C-contiguous.
    pub fn is_contiguous(&self) -> bool {
        self.strides == Self::compute_contiguous_strides(&self.shape)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
}

impl fmt::Debug for TensorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TensorLayout {{ shape: {:?}, strides: {:?} }}",
            self.shape, self.strides
        )
    }
}
