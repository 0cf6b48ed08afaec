//! MINN binary model format.
//!
//! Deterministic, versioned serialization of a [`Model`]. All integers are
//! little-endian; payloads are raw IEEE-754 32-bit floats.
//!
//! # Format Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Header (16 bytes, fixed)                     │
//! │   magic u32 | ver_major u16 | ver_minor u16  │
//! │   num_layers u32 | reserved u32              │
//! ├──────────────────────────────────────────────┤
//! │ Per layer:                                   │
//! │   layer_type u8                              │
//! │   [Linear only] weight record, bias record   │
//! │     dtype u8 | rank u32 | dims[rank] u32     │
//! │     payload: prod(dims) x f32                │
//! ├──────────────────────────────────────────────┤
//! │ Trailer:                                     │
//! │   input_rank u32  | input_dims[rank] u32     │
//! │   output_rank u32 | output_dims[rank] u32    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Loading is strict: any header or payload mismatch aborts the entire load
//! and no partial model is returned.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{MininnError, Result};
use crate::layer::{Layer, LayerType, LinearLayer};
use crate::model::Model;
use crate::tensor::{DataType, Tensor};

/// Magic number, "MINN" read as a little-endian u32.
pub const MAGIC: u32 = 0x4E4E_494D;
/// Major format version; a mismatch rejects the file.
pub const VERSION_MAJOR: u16 = 1;
/// Minor format version; informational only.
pub const VERSION_MINOR: u16 = 0;
/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 16;
/// Sanity ceiling on the layer count.
pub const MAX_LAYERS: u32 = 1000;
/// Tensor records are bounded to this rank.
pub const MAX_TENSOR_RANK: u32 = 8;

/// Fixed 16-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format magic, must equal [`MAGIC`]
    pub magic: u32,
    /// Major version, must equal [`VERSION_MAJOR`]
    pub version_major: u16,
    /// Minor version, informational
    pub version_minor: u16,
    /// Number of layer records that follow
    pub num_layers: u32,
    /// Reserved, ignored on read
    pub reserved: u32,
}

impl Header {
    /// Header for a freshly written model with the current version.
    #[must_use]
    pub fn new(num_layers: u32) -> Self {
        Self {
            magic: MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            num_layers,
            reserved: 0,
        }
    }

    /// Parse a header from its 16-byte on-disk form.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            magic: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            version_major: u16::from_le_bytes([bytes[4], bytes[5]]),
            version_minor: u16::from_le_bytes([bytes[6], bytes[7]]),
            num_layers: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            reserved: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        }
    }

    /// Serialize to the 16-byte on-disk form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version_major.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.version_minor.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.num_layers.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    /// Validate magic, version, and layer count.
    ///
    /// # Errors
    ///
    /// `FormatError` on a magic mismatch or an excessive layer count,
    /// `UnsupportedVersion` on a major version mismatch, `EmptyModel` for a
    /// zero layer count.
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(MininnError::FormatError {
                message: format!("magic number mismatch: 0x{:08X}", self.magic),
            });
        }
        if self.version_major != VERSION_MAJOR {
            return Err(MininnError::UnsupportedVersion {
                found: (self.version_major, self.version_minor),
                supported: (VERSION_MAJOR, VERSION_MINOR),
            });
        }
        if self.num_layers == 0 {
            return Err(MininnError::EmptyModel);
        }
        if self.num_layers > MAX_LAYERS {
            return Err(MininnError::FormatError {
                message: format!(
                    "too many layers: {} (maximum {MAX_LAYERS})",
                    self.num_layers
                ),
            });
        }
        Ok(())
    }
}

/// Load a model from a file.
///
/// # Errors
///
/// Returns `LoadError` wrapping the underlying cause: `FormatError`,
/// `UnsupportedVersion`, `EmptyModel`, `UnknownLayerType`,
/// `UnsupportedDType`, `TruncatedFile`, `Io`, or a tensor construction
/// error for malformed dimension records.
///
/// # Examples
///
/// ```no_run
/// use mininn::format;
///
/// let model = format::load_model("model.minn")?;
/// # Ok::<(), mininn::MininnError>(())
/// ```
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    let wrap = |source: MininnError| MininnError::LoadError {
        path: path.display().to_string(),
        source: Box::new(source),
    };

    let file = File::open(path).map_err(|e| wrap(e.into()))?;
    let mut reader = BufReader::new(file);
    read_model(&mut reader).map_err(wrap)
}

/// Save a model to a file.
///
/// The write is the structural inverse of [`load_model`]: header with the
/// actual layer count, one record per layer, then the shape trailer.
///
/// # Errors
///
/// Returns `SaveError` wrapping `EmptyModel` for a layer-less model,
/// `FormatError` for counts or dimensions the format cannot represent, or
/// `Io` for write failures.
pub fn save_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
    let path = path.as_ref();
    let wrap = |source: MininnError| MininnError::SaveError {
        path: path.display().to_string(),
        source: Box::new(source),
    };

    let file = File::create(path).map_err(|e| wrap(e.into()))?;
    let mut writer = BufWriter::new(file);
    write_model(model, &mut writer).map_err(wrap)?;
    writer.flush().map_err(|e| wrap(e.into()))
}

/// Cheap plausibility probe: does this file start with the MINN magic?
///
/// Only the first four bytes are inspected; any I/O failure reads as "no".
pub fn is_model_file<P: AsRef<Path>>(path: P) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() {
        return false;
    }
    u32::from_le_bytes(magic) == MAGIC
}

/// Read a complete model from a stream.
///
/// # Errors
///
/// Same conditions as [`load_model`], without the path wrapper.
pub fn read_model<R: Read>(reader: &mut R) -> Result<Model> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    read_exact(reader, &mut header_bytes, "header")?;
    let header = Header::from_bytes(&header_bytes);
    header.validate()?;

    let mut model = Model::new();
    for index in 0..header.num_layers {
        model.add_layer(read_layer(reader, index)?);
    }

    let input_shape = read_shape(reader, "input shape")?;
    let output_shape = read_shape(reader, "output shape")?;
    model.set_input_shape(input_shape);
    model.set_output_shape(output_shape);

    Ok(model)
}

/// Write a complete model to a stream.
///
/// # Errors
///
/// Same conditions as [`save_model`], without the path wrapper.
pub fn write_model<W: Write>(model: &Model, writer: &mut W) -> Result<()> {
    if model.is_empty() {
        return Err(MininnError::EmptyModel);
    }
    let num_layers = u32::try_from(model.num_layers()).map_err(|_| MininnError::FormatError {
        message: format!("layer count {} does not fit the format", model.num_layers()),
    })?;
    if num_layers > MAX_LAYERS {
        return Err(MininnError::FormatError {
            message: format!("too many layers: {num_layers} (maximum {MAX_LAYERS})"),
        });
    }

    writer.write_all(&Header::new(num_layers).to_bytes())?;

    for layer in model.layers() {
        writer.write_all(&[layer.layer_type().to_tag()])?;
        if let Layer::Linear(linear) = layer {
            write_tensor(linear.weights(), writer)?;
            write_tensor(linear.bias(), writer)?;
        }
    }

    write_shape(model.input_shape(), writer)?;
    write_shape(model.output_shape(), writer)?;
    Ok(())
}

fn read_layer<R: Read>(reader: &mut R, index: u32) -> Result<Layer> {
    let tag = read_u8(reader, "layer type tag")?;
    match LayerType::from_tag(tag)? {
        LayerType::Linear => {
            let weights = read_tensor(reader, &format!("layer {index} weights"))?;
            let bias = read_tensor(reader, &format!("layer {index} bias"))?;
            Ok(Layer::Linear(LinearLayer::new(weights, bias)?))
        }
        LayerType::ReLU => Ok(Layer::ReLU),
        LayerType::Sigmoid => Ok(Layer::Sigmoid),
        LayerType::Softmax => Ok(Layer::Softmax),
    }
}

fn read_tensor<R: Read>(reader: &mut R, context: &str) -> Result<Tensor> {
    let dtype_tag = read_u8(reader, context)?;
    let dtype = DataType::from_tag(dtype_tag)?;
    if dtype != DataType::Float32 {
        return Err(MininnError::UnsupportedDType {
            dtype: dtype.name().to_string(),
        });
    }

    let rank = read_u32(reader, context)?;
    if rank == 0 || rank > MAX_TENSOR_RANK {
        return Err(MininnError::FormatError {
            message: format!("invalid tensor rank {rank} in {context} (expected 1..={MAX_TENSOR_RANK})"),
        });
    }

    let mut shape = Vec::with_capacity(rank as usize);
    let mut total: Option<u64> = Some(1);
    for _ in 0..rank {
        let dim = read_u32(reader, context)?;
        total = total.and_then(|t| t.checked_mul(u64::from(dim)));
        shape.push(dim as usize);
    }
    let payload_len = total
        .and_then(|t| t.checked_mul(4))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| MininnError::FormatError {
            message: format!("tensor in {context} is too large"),
        })?;

    let mut payload = vec![0u8; payload_len];
    read_exact(reader, &mut payload, context)?;
    let data = payload
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Tensor::from_vec(&shape, data)
}

fn write_tensor<W: Write>(tensor: &Tensor, writer: &mut W) -> Result<()> {
    writer.write_all(&[tensor.dtype().to_tag()])?;

    let rank = u32::try_from(tensor.rank()).map_err(|_| MininnError::FormatError {
        message: format!("tensor rank {} does not fit the format", tensor.rank()),
    })?;
    writer.write_all(&rank.to_le_bytes())?;
    for &dim in tensor.shape() {
        let dim = u32::try_from(dim).map_err(|_| MininnError::FormatError {
            message: format!("tensor dimension {dim} does not fit the format"),
        })?;
        writer.write_all(&dim.to_le_bytes())?;
    }
    for &value in tensor.data() {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

fn read_shape<R: Read>(reader: &mut R, context: &str) -> Result<Vec<usize>> {
    let rank = read_u32(reader, context)?;
    let mut shape = Vec::with_capacity(rank.min(MAX_TENSOR_RANK) as usize);
    for _ in 0..rank {
        shape.push(read_u32(reader, context)? as usize);
    }
    Ok(shape)
}

fn write_shape<W: Write>(shape: &[usize], writer: &mut W) -> Result<()> {
    let rank = u32::try_from(shape.len()).map_err(|_| MininnError::FormatError {
        message: format!("shape rank {} does not fit the format", shape.len()),
    })?;
    writer.write_all(&rank.to_le_bytes())?;
    for &dim in shape {
        let dim = u32::try_from(dim).map_err(|_| MininnError::FormatError {
            message: format!("shape dimension {dim} does not fit the format"),
        })?;
        writer.write_all(&dim.to_le_bytes())?;
    }
    Ok(())
}

fn read_u8<R: Read>(reader: &mut R, context: &str) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(reader, &mut buf, context)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R, context: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, context)?;
    Ok(u32::from_le_bytes(buf))
}

/// A short read is a truncated file, any other failure is plain I/O.
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], context: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            MininnError::truncated(context)
        } else {
            MininnError::Io(e)
        }
    })
}
