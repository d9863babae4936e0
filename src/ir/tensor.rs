use half::f16;
use ndarray::{ArrayD, IxDyn};

use crate::error::Result;
use crate::ir::graph::IrDataType;
use crate::layout::TensorLayout;

/// Dense weight tensor in its storage precision
#[derive(Debug, Clone, PartialEq)]
pub enum WeightTensor {
    Float16(ArrayD<f16>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

impl WeightTensor {
    /// IR data type of the stored elements
    pub fn data_type(&self) -> IrDataType {
        match self {
            WeightTensor::Float16(_) => IrDataType::Float16,
            WeightTensor::Float32(_) => IrDataType::Float32,
            WeightTensor::Float64(_) => IrDataType::Float64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            WeightTensor::Float16(a) => a.shape(),
            WeightTensor::Float32(a) => a.shape(),
            WeightTensor::Float64(a) => a.shape(),
        }
    }

    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the elements (in row-major order) under a new shape
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let current = TensorLayout::contiguous_layout(self.shape());
        let layout = TensorLayout::reshaped_layout(&current, shape)?;

        Ok(match self {
            WeightTensor::Float16(a) => WeightTensor::Float16(reshape_array(a, layout.shape())?),
            WeightTensor::Float32(a) => WeightTensor::Float32(reshape_array(a, layout.shape())?),
            WeightTensor::Float64(a) => WeightTensor::Float64(reshape_array(a, layout.shape())?),
        })
    }

    /// Permute the axes; the result is stored contiguously in the new order
    pub fn transpose(&self, axes: &[usize]) -> Result<Self> {
        let current = TensorLayout::contiguous_layout(self.shape());
        TensorLayout::transposed_layout(&current, axes)?;

        Ok(match self {
            WeightTensor::Float16(a) => WeightTensor::Float16(permute_array(a, axes)),
            WeightTensor::Float32(a) => WeightTensor::Float32(permute_array(a, axes)),
            WeightTensor::Float64(a) => WeightTensor::Float64(permute_array(a, axes)),
        })
    }

    /// Widen every element to f64
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self {
            WeightTensor::Float16(a) => a.mapv(|v| v.to_f64()),
            WeightTensor::Float32(a) => a.mapv(f64::from),
            WeightTensor::Float64(a) => a.clone(),
        }
    }

    /// Cast to 32-bit floating point regardless of storage precision
    pub fn to_f32(&self) -> ArrayD<f32> {
        match self {
            WeightTensor::Float16(a) => a.mapv(|v| v.to_f32()),
            WeightTensor::Float32(a) => a.clone(),
            WeightTensor::Float64(a) => a.mapv(|v| v as f32),
        }
    }

    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            WeightTensor::Float32(a) => Some(a),
            _ => None,
        }
    }
}

impl From<ArrayD<f32>> for WeightTensor {
    fn from(array: ArrayD<f32>) -> Self {
        WeightTensor::Float32(array)
    }
}

impl From<ArrayD<f64>> for WeightTensor {
    fn from(array: ArrayD<f64>) -> Self {
        WeightTensor::Float64(array)
    }
}

impl From<ArrayD<f16>> for WeightTensor {
    fn from(array: ArrayD<f16>) -> Self {
        WeightTensor::Float16(array)
    }
}

fn reshape_array<A: Clone>(array: &ArrayD<A>, shape: &[usize]) -> Result<ArrayD<A>> {
    Ok(array
        .as_standard_layout()
        .into_owned()
        .into_shape(IxDyn(shape))?)
}

fn permute_array<A: Clone>(array: &ArrayD<A>, axes: &[usize]) -> ArrayD<A> {
    array
        .view()
        .permuted_axes(IxDyn(axes))
        .as_standard_layout()
        .into_owned()
}
