use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use bytes::{Buf, BufMut};
use flate2::read::GzDecoder;
use half::f16;
use log::{debug, info, warn};
use ndarray::{ArrayD, IxDyn};
use prost::Message;
use tar::Archive;

use crate::error::{Error, Result};
use crate::ir::WeightTensor;
use crate::parser::parameters::ParameterStore;
use crate::proto::{ModelConfig, ParameterConfig};

/// Size of the header preceding every parameter payload
pub const PARAMETER_HEADER_LEN: usize = 16;

/// Suffix of archive entries holding a parameter's `ParameterConfig`
const PARAMETER_CONFIG_SUFFIX: &str = ".protobuf";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Loader for network configurations and trained parameters
pub struct PaddleModelLoader;

impl PaddleModelLoader {
    /// Load a serialized `ModelConfig` from a file path
    pub fn load_config(path: &Path) -> Result<ModelConfig> {
        let buffer = fs::read(path).map_err(|e| {
            Error::ModelLoadError(path.to_path_buf(), format!("Failed to read file: {}", e))
        })?;

        Self::load_config_from_bytes(&buffer)
    }

    /// Load a `ModelConfig` from bytes
    pub fn load_config_from_bytes(data: &[u8]) -> Result<ModelConfig> {
        let config = ModelConfig::decode(data)?;
        if config.layers.is_empty() {
            return Err(Error::InvalidConfig("Network declares no layers".to_string()));
        }
        Ok(config)
    }

    /// Load parameters from a directory, a `.tar` or a `.tar.gz` archive.
    ///
    /// A path that does not exist is not an error: the returned store reports
    /// `weights_loaded() == false` and conversion proceeds without weights.
    pub fn load_parameters(path: &Path) -> Result<ParameterStore> {
        if !path.exists() {
            warn!(
                "Weights file {} not found, converting without weights",
                path.display()
            );
            return Ok(ParameterStore::not_loaded());
        }

        let store = if path.is_dir() {
            Self::load_parameters_from_dir(path)?
        } else {
            Self::load_parameters_from_archive(path)?
        };

        info!("Loaded {} parameters from {}", store.len(), path.display());
        Ok(store)
    }

    /// Every regular file in `dir` is a parameter payload named after its file
    pub fn load_parameters_from_dir(dir: &Path) -> Result<ParameterStore> {
        let mut entries = HashMap::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.insert(name, fs::read(entry.path())?);
        }

        Self::assemble(entries)
    }

    /// Read a tar archive, gzip-compressed or not
    pub fn load_parameters_from_archive(path: &Path) -> Result<ParameterStore> {
        let file = File::open(path).map_err(|e| {
            Error::ModelLoadError(path.to_path_buf(), format!("Failed to open file: {}", e))
        })?;
        let mut reader = BufReader::new(file);
        let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

        let reader: Box<dyn Read> = if is_gzip {
            Box::new(GzDecoder::new(reader))
        } else {
            Box::new(reader)
        };

        let mut archive = Archive::new(reader);
        let mut entries = HashMap::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = match entry.path()?.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            entries.insert(name, data);
        }

        Self::assemble(entries)
    }

    /// Decode payloads and apply declared dims from matching `ParameterConfig` entries
    fn assemble(mut entries: HashMap<String, Vec<u8>>) -> Result<ParameterStore> {
        let config_names: Vec<String> = entries
            .keys()
            .filter(|name| name.ends_with(PARAMETER_CONFIG_SUFFIX))
            .cloned()
            .collect();

        let mut configs = HashMap::new();
        for name in config_names {
            if let Some(data) = entries.remove(&name) {
                let config = ParameterConfig::decode(data.as_slice())?;
                configs.insert(config.name.clone(), config);
            }
        }

        let mut store = ParameterStore::new();
        for (name, data) in entries {
            let mut tensor = Self::decode_parameter(&name, &data)?;
            if let Some(config) = configs.get(&name) {
                tensor = Self::apply_dims(&name, tensor, config)?;
            }
            debug!("Parameter {} {:?}", name, tensor.shape());
            store.insert(name, tensor);
        }

        Ok(store)
    }

    fn apply_dims(name: &str, tensor: WeightTensor, config: &ParameterConfig) -> Result<WeightTensor> {
        if config.size as usize != tensor.len() {
            return Err(Error::InvalidParameter(
                name.to_string(),
                format!("declared size {} but payload holds {}", config.size, tensor.len()),
            ));
        }
        if config.dims.is_empty() {
            return Ok(tensor);
        }
        let dims: Vec<usize> = config.dims.iter().map(|&d| d as usize).collect();
        tensor.reshape(&dims)
    }

    /// Decode one parameter payload into a flat tensor
    pub fn decode_parameter(name: &str, data: &[u8]) -> Result<WeightTensor> {
        let invalid = |reason: String| Error::InvalidParameter(name.to_string(), reason);

        let mut buf = data;
        if buf.remaining() < PARAMETER_HEADER_LEN {
            return Err(invalid(format!("payload of {} bytes has no header", data.len())));
        }
        let _format = buf.get_i32_le();
        let value_size = buf.get_u32_le() as usize;
        let count = buf.get_u64_le() as usize;

        let expected = count
            .checked_mul(value_size)
            .ok_or_else(|| invalid(format!("element count {} overflows", count)))?;
        if buf.remaining() != expected {
            return Err(invalid(format!(
                "expected {} bytes of values, found {}",
                expected,
                buf.remaining()
            )));
        }

        let shape = IxDyn(&[count]);
        let tensor = match value_size {
            2 => {
                let values = (0..count).map(|_| f16::from_bits(buf.get_u16_le())).collect();
                WeightTensor::Float16(ArrayD::from_shape_vec(shape, values)?)
            }
            4 => {
                let values = (0..count).map(|_| buf.get_f32_le()).collect();
                WeightTensor::Float32(ArrayD::from_shape_vec(shape, values)?)
            }
            8 => {
                let values = (0..count).map(|_| buf.get_f64_le()).collect();
                WeightTensor::Float64(ArrayD::from_shape_vec(shape, values)?)
            }
            other => return Err(invalid(format!("unsupported value size {}", other))),
        };

        Ok(tensor)
    }

    /// Serialize a tensor into the payload format read by `decode_parameter`
    pub fn encode_parameter(tensor: &WeightTensor) -> Vec<u8> {
        let count = tensor.len();
        let value_size = match tensor {
            WeightTensor::Float16(_) => 2,
            WeightTensor::Float32(_) => 4,
            WeightTensor::Float64(_) => 8,
        };

        let mut out = Vec::with_capacity(PARAMETER_HEADER_LEN + count * value_size);
        out.put_i32_le(0);
        out.put_u32_le(value_size as u32);
        out.put_u64_le(count as u64);
        match tensor {
            WeightTensor::Float16(a) => a.iter().for_each(|v| out.put_u16_le(v.to_bits())),
            WeightTensor::Float32(a) => a.iter().for_each(|v| out.put_f32_le(*v)),
            WeightTensor::Float64(a) => a.iter().for_each(|v| out.put_f64_le(*v)),
        }
        out
    }
}
