//! Binary encoding of fitted models.
//!
//! Layout: `[magic: u32 BE][header len: u32 BE][header: JSON][params: f32 LE...]`.

use std::io;

use serde::{Deserialize, Serialize};

use crate::{
    MlErr,
    arch::{LogisticRegression, Standardizer},
};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();
const MAGIC: Header = Header::from_be_bytes(*b"LRM1");
const PARAM_SIZE: usize = size_of::<f32>();

/// Everything about a model except its parameters.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ModelHeader {
    feature_names: Vec<String>,
    n_classes: usize,
    mean: Vec<f32>,
    scale: Vec<f32>,
    n_params: usize,
}

/// Serializes `model` into a self-describing byte buffer.
///
/// # Returns
/// The encoded model or an io error if the header can't be serialized.
pub fn encode(model: &LogisticRegression) -> io::Result<Vec<u8>> {
    let header = ModelHeader {
        feature_names: model.feature_names().to_vec(),
        n_classes: model.n_classes(),
        mean: model.scaler().mean().to_vec(),
        scale: model.scaler().scale().to_vec(),
        n_params: model.params().len(),
    };

    let json = serde_json::to_vec(&header)?;
    let json_len = Header::try_from(json.len()).map_err(|_| too_large(json.len()))?;
    let params: &[u8] = bytemuck::cast_slice(model.params());

    let mut buf = Vec::with_capacity(2 * HEADER_SIZE + json.len() + params.len());
    buf.extend_from_slice(&MAGIC.to_be_bytes());
    buf.extend_from_slice(&json_len.to_be_bytes());
    buf.extend_from_slice(&json);
    buf.extend_from_slice(params);

    Ok(buf)
}

/// Deserializes a model previously serialized with `encode`.
///
/// # Returns
/// The decoded model or an `InvalidData` io error if the buffer is not a valid model.
pub fn decode(buf: &[u8]) -> io::Result<LogisticRegression> {
    let (magic, rest) = split_header(buf)?;
    if magic != MAGIC {
        return invalid(format!("Received an invalid magic number {magic:#010x}"));
    }

    let (json_len, rest) = split_header(rest)?;
    let json_len = json_len as usize;
    if rest.len() < json_len {
        return invalid(format!(
            "The header claims {json_len} bytes but only {} remain",
            rest.len()
        ));
    }

    let (json, payload) = rest.split_at(json_len);
    let header: ModelHeader = serde_json::from_slice(json)?;

    if payload.len() != header.n_params * PARAM_SIZE {
        return invalid(format!(
            "Expected {} parameter bytes, got {}",
            header.n_params * PARAM_SIZE,
            payload.len()
        ));
    }

    let params: Vec<f32> = bytemuck::allocation::pod_collect_to_vec(payload);
    let scaler = Standardizer::from_parts(header.mean, header.scale).map_err(to_invalid)?;

    LogisticRegression::from_parts(header.feature_names, scaler, header.n_classes, params)
        .map_err(to_invalid)
}

fn split_header(buf: &[u8]) -> io::Result<(Header, &[u8])> {
    if buf.len() < HEADER_SIZE {
        return invalid(format!(
            "The given buffer is too small {}, must at least be {HEADER_SIZE} bytes",
            buf.len()
        ));
    }

    let (head, rest) = buf.split_at(HEADER_SIZE);
    // SAFETY: We splitted the buffer to be of size `HEADER_SIZE` just above.
    let value = Header::from_be_bytes(head.try_into().unwrap());
    Ok((value, rest))
}

fn invalid<T>(msg: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidData, msg))
}

fn to_invalid(err: MlErr) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

fn too_large(len: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("The model header is too large: {len} bytes"),
    )
}
