//! GIFTI surface and data files (`.gii`).
//!
//! A GIFTI file is an XML document holding a list of `DataArray`s. The mesh lives in the first
//! array with intent `NIFTI_INTENT_POINTSET` (coordinates) and the first with intent
//! `NIFTI_INTENT_TRIANGLE` (faces). Any other array is per-vertex data.
//!
//! Payloads may be `ASCII`, `Base64Binary` or `GZipBase64Binary` (a zlib stream, despite the
//! name). External binary files are not supported.

use std::io::Read;
use std::path::Path;

use base64::Engine;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use laminar_mesh::{reorder, Facet, Geometry, MemoryOrder, Vector3, VertexData};

use crate::error::{Error, Result};
use crate::text::read_text;

const FORMAT: &str = "GIFTI";

pub const INTENT_POINTSET: &str = "NIFTI_INTENT_POINTSET";
pub const INTENT_TRIANGLE: &str = "NIFTI_INTENT_TRIANGLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    UInt8,
    Int32,
    Float32,
    Float64,
}

impl DataType {
    fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "NIFTI_TYPE_UINT8" => DataType::UInt8,
            "NIFTI_TYPE_INT32" => DataType::Int32,
            "NIFTI_TYPE_FLOAT32" => DataType::Float32,
            "NIFTI_TYPE_FLOAT64" => DataType::Float64,
            other => return Err(Error::invalid(FORMAT, format!("unsupported DataType {other}"))),
        })
    }

    fn size(self) -> usize {
        match self {
            DataType::UInt8 => 1,
            DataType::Int32 | DataType::Float32 => 4,
            DataType::Float64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    Base64,
    ZlibBase64,
}

/// Decoded array contents, kept in their stored type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    UInt8(Vec<u8>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl ArrayValues {
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::UInt8(v) => v.len(),
            ArrayValues::Int32(v) => v.len(),
            ArrayValues::Float32(v) => v.len(),
            ArrayValues::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            ArrayValues::UInt8(v) => v.iter().map(|&x| x as f32).collect(),
            ArrayValues::Int32(v) => v.iter().map(|&x| x as f32).collect(),
            ArrayValues::Float32(v) => v.clone(),
            ArrayValues::Float64(v) => v.iter().map(|&x| x as f32).collect(),
        }
    }

    /// Converts to vertex indices. Fails on negative or fractional values.
    pub fn to_indices(&self) -> Result<Vec<u32>> {
        let bad = |x: String| Error::invalid(FORMAT, format!("{x} is not a vertex index"));
        match self {
            ArrayValues::UInt8(v) => Ok(v.iter().map(|&x| x as u32).collect()),
            ArrayValues::Int32(v) => v
                .iter()
                .map(|&x| u32::try_from(x).map_err(|_| bad(x.to_string())))
                .collect(),
            ArrayValues::Float32(v) => v.iter().map(|&x| float_index(x as f64).ok_or_else(|| bad(x.to_string()))).collect(),
            ArrayValues::Float64(v) => v.iter().map(|&x| float_index(x).ok_or_else(|| bad(x.to_string()))).collect(),
        }
    }
}

fn float_index(x: f64) -> Option<u32> {
    (x >= 0.0 && x.fract() == 0.0 && x <= u32::MAX as f64).then_some(x as u32)
}

/// One `DataArray` of a GIFTI file.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftiArray {
    pub intent: String,
    pub data_type: DataType,
    pub dims: Vec<usize>,
    pub order: MemoryOrder,
    pub values: ArrayValues,
}

impl GiftiArray {
    /// Rows and columns of the array viewed as a table; 1-D arrays are a single column.
    pub fn shape(&self) -> (usize, usize) {
        let rows = self.dims.first().copied().unwrap_or(0);
        let cols = self
            .dims
            .iter()
            .skip(1)
            .fold(1usize, |n, &d| n.saturating_mul(d))
            .max(1);
        (rows, cols)
    }

    /// [`GiftiArray::shape`], checked against the number of values actually held.
    fn table(&self) -> Result<(usize, usize)> {
        let (rows, cols) = self.shape();
        if rows.checked_mul(cols) != Some(self.values.len()) {
            return Err(Error::invalid(
                FORMAT,
                format!(
                    "{} array has dimensions {:?} but holds {} values",
                    self.intent,
                    self.dims,
                    self.values.len()
                ),
            ));
        }
        Ok((rows, cols))
    }

    /// The values as `f32`, row-major.
    pub fn rows_f32(&self) -> Result<Vec<f32>> {
        let (rows, cols) = self.table()?;
        Ok(reorder(&self.values.to_f32(), rows, cols, self.order, MemoryOrder::RowMajor))
    }

    fn rows_indices(&self) -> Result<Vec<u32>> {
        let (rows, cols) = self.table()?;
        Ok(reorder(&self.values.to_indices()?, rows, cols, self.order, MemoryOrder::RowMajor))
    }

    fn expect_columns(&self, cols: usize) -> Result<usize> {
        let (rows, actual) = self.shape();
        if self.dims.len() != 2 || actual != cols {
            return Err(Error::invalid(
                FORMAT,
                format!("{} array has dimensions {:?}, expected [n, {cols}]", self.intent, self.dims),
            ));
        }
        Ok(rows)
    }

    /// Interprets the array as per-vertex data.
    pub fn to_vertex_data(&self) -> Result<VertexData> {
        let (_, cols) = self.table()?;
        VertexData::from_rows(cols, self.rows_f32()?)
            .ok_or_else(|| Error::invalid(FORMAT, "data array does not split into rows"))
    }
}

/// Everything needed to decode the payload of a `DataArray`.
struct ArrayHeader {
    intent: String,
    data_type: DataType,
    dims: Vec<usize>,
    order: MemoryOrder,
    encoding: Encoding,
    big_endian: bool,
}

impl ArrayHeader {
    fn from_element(e: &BytesStart<'_>) -> Result<Self> {
        let mut intent = String::new();
        let mut data_type = None;
        let mut dimensionality = 0usize;
        let mut dims = [0usize; 6];
        let mut order = MemoryOrder::RowMajor;
        let mut encoding = Encoding::Ascii;
        let mut big_endian = false;

        for attr in e.attributes() {
            let attr = attr.map_err(|e| Error::invalid(FORMAT, e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::invalid(FORMAT, e.to_string()))?;
            let value = value.trim();
            match attr.key.as_ref() {
                b"Intent" => intent = value.to_string(),
                b"DataType" => data_type = Some(DataType::parse(value)?),
                b"ArrayIndexingOrder" => {
                    order = match value {
                        "RowMajorOrder" => MemoryOrder::RowMajor,
                        "ColumnMajorOrder" => MemoryOrder::ColumnMajor,
                        other => {
                            return Err(Error::invalid(FORMAT, format!("unknown ArrayIndexingOrder {other}")))
                        }
                    }
                }
                b"Dimensionality" => dimensionality = parse_attr(value, "Dimensionality")?,
                b"Encoding" => {
                    encoding = match value {
                        "ASCII" => Encoding::Ascii,
                        "Base64Binary" => Encoding::Base64,
                        "GZipBase64Binary" => Encoding::ZlibBase64,
                        other => {
                            return Err(Error::UnsupportedFormat(format!("GIFTI encoding {other}")))
                        }
                    }
                }
                b"Endian" => big_endian = value == "BigEndian",
                key => {
                    if let Some(i) = key.strip_prefix(b"Dim").and_then(|d| std::str::from_utf8(d).ok()).and_then(|d| d.parse::<usize>().ok()) {
                        if i < dims.len() {
                            dims[i] = parse_attr(value, "Dim")?;
                        }
                    }
                }
            }
        }

        if dimensionality == 0 || dimensionality > dims.len() {
            return Err(Error::invalid(FORMAT, format!("unsupported Dimensionality {dimensionality}")));
        }
        Ok(Self {
            intent,
            data_type: data_type.ok_or_else(|| Error::invalid(FORMAT, "DataArray without DataType"))?,
            dims: dims[..dimensionality].to_vec(),
            order,
            encoding,
            big_endian,
        })
    }

    fn decode(self, payload: &str) -> Result<GiftiArray> {
        let count = self
            .dims
            .iter()
            .try_fold(1usize, |n, &d| n.checked_mul(d))
            .ok_or_else(|| Error::invalid(FORMAT, format!("dimensions {:?} overflow", self.dims)))?;
        let values = match self.encoding {
            Encoding::Ascii => parse_ascii(payload, self.data_type)?,
            Encoding::Base64 | Encoding::ZlibBase64 => {
                let compact: String = payload.split_whitespace().collect();
                let mut bytes = base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map_err(|e| Error::invalid(FORMAT, e.to_string()))?;
                if self.encoding == Encoding::ZlibBase64 {
                    let mut inflated = Vec::new();
                    ZlibDecoder::new(bytes.as_slice()).read_to_end(&mut inflated)?;
                    bytes = inflated;
                }
                parse_binary(&bytes, self.data_type, self.big_endian)?
            }
        };
        if values.len() != count {
            return Err(Error::invalid(
                FORMAT,
                format!("{} array declares {count} values but holds {}", self.intent, values.len()),
            ));
        }
        Ok(GiftiArray {
            intent: self.intent,
            data_type: self.data_type,
            dims: self.dims,
            order: self.order,
            values,
        })
    }
}

fn parse_attr(value: &str, name: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| Error::invalid(FORMAT, format!("{name}={value:?} is not a count")))
}

fn parse_ascii(payload: &str, data_type: DataType) -> Result<ArrayValues> {
    fn all<T: std::str::FromStr>(payload: &str) -> Result<Vec<T>> {
        payload
            .split_whitespace()
            .map(|t| t.parse().map_err(|_| Error::invalid(FORMAT, format!("bad ASCII value {t:?}"))))
            .collect()
    }
    Ok(match data_type {
        DataType::UInt8 => ArrayValues::UInt8(all(payload)?),
        DataType::Int32 => ArrayValues::Int32(all(payload)?),
        DataType::Float32 => ArrayValues::Float32(all(payload)?),
        DataType::Float64 => ArrayValues::Float64(all(payload)?),
    })
}

fn parse_binary(bytes: &[u8], data_type: DataType, big_endian: bool) -> Result<ArrayValues> {
    let size = data_type.size();
    if bytes.len() % size != 0 {
        return Err(Error::invalid(
            FORMAT,
            format!("{} bytes is not a whole number of {size}-byte values", bytes.len()),
        ));
    }
    let n = bytes.len() / size;
    macro_rules! read_into {
        ($variant:ident, $ty:ty, $read:ident) => {{
            let mut out = vec![<$ty>::default(); n];
            if big_endian {
                BigEndian::$read(bytes, &mut out);
            } else {
                LittleEndian::$read(bytes, &mut out);
            }
            ArrayValues::$variant(out)
        }};
    }
    Ok(match data_type {
        DataType::UInt8 => ArrayValues::UInt8(bytes.to_vec()),
        DataType::Int32 => read_into!(Int32, i32, read_i32_into),
        DataType::Float32 => read_into!(Float32, f32, read_f32_into),
        DataType::Float64 => read_into!(Float64, f64, read_f64_into),
    })
}

/// Parses every `DataArray` of a GIFTI document, in file order.
pub fn parse_gifti_arrays(text: &str) -> Result<Vec<GiftiArray>> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut arrays = Vec::new();
    let mut header: Option<ArrayHeader> = None;
    let mut payload: Option<String> = None;
    loop {
        match reader
            .read_event()
            .map_err(|e| Error::invalid(FORMAT, format!("at byte {}: {e}", reader.buffer_position())))?
        {
            Event::Start(e) if e.name().as_ref() == b"DataArray" => {
                header = Some(ArrayHeader::from_element(&e)?);
            }
            Event::Start(e) if e.name().as_ref() == b"Data" => payload = Some(String::new()),
            Event::Empty(e) if e.name().as_ref() == b"Data" => {
                if let Some(h) = header.take() {
                    arrays.push(h.decode("")?);
                }
            }
            Event::Text(t) => {
                if let Some(p) = payload.as_mut() {
                    p.push_str(&t.unescape().map_err(|e| Error::invalid(FORMAT, e.to_string()))?);
                }
            }
            Event::CData(c) => {
                if let Some(p) = payload.as_mut() {
                    let raw = c.into_inner();
                    p.push_str(
                        std::str::from_utf8(&raw).map_err(|e| Error::invalid(FORMAT, e.to_string()))?,
                    );
                }
            }
            Event::End(e) if e.name().as_ref() == b"Data" => {
                let data = payload.take().unwrap_or_default();
                let h = header
                    .take()
                    .ok_or_else(|| Error::invalid(FORMAT, "Data element outside a DataArray"))?;
                arrays.push(h.decode(&data)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    log::debug!("GIFTI: {} data arrays", arrays.len());
    Ok(arrays)
}

pub fn read_gifti_arrays<P: AsRef<Path>>(p: P) -> Result<Vec<GiftiArray>> {
    let text = read_text(p.as_ref(), FORMAT)?;
    parse_gifti_arrays(&text)
}

fn find_intent<'a>(arrays: &'a [GiftiArray], intent: &str) -> Result<&'a GiftiArray> {
    arrays
        .iter()
        .find(|a| a.intent == intent)
        .ok_or_else(|| Error::invalid(FORMAT, format!("no {intent} array")))
}

/// Builds a geometry from the pointset and triangle arrays of a parsed GIFTI file.
pub fn geometry_from_arrays(arrays: &[GiftiArray]) -> Result<Geometry> {
    let points = find_intent(arrays, INTENT_POINTSET)?;
    let triangles = find_intent(arrays, INTENT_TRIANGLE)?;
    points.expect_columns(3)?;
    triangles.expect_columns(3)?;

    let vertices = points
        .rows_f32()?
        .chunks_exact(3)
        .map(|c| Vector3::new(c[0], c[1], c[2]))
        .collect();
    let facets = triangles
        .rows_indices()?
        .chunks_exact(3)
        .map(|i| Facet::new(i[0], i[1], i[2]))
        .collect();
    Ok(Geometry::new(vertices, facets)?)
}

pub fn read_gifti<P: AsRef<Path>>(p: P) -> Result<Geometry> {
    geometry_from_arrays(&read_gifti_arrays(p)?)
}

pub fn parse_gifti(text: &str) -> Result<Geometry> {
    geometry_from_arrays(&parse_gifti_arrays(text)?)
}

/// Reads data array `index` of a GIFTI file as per-vertex data.
pub fn read_gifti_data<P: AsRef<Path>>(p: P, index: usize) -> Result<VertexData> {
    let arrays = read_gifti_arrays(p)?;
    let array = arrays.get(index).ok_or_else(|| {
        Error::invalid(FORMAT, format!("no data array {index}; the file has {}", arrays.len()))
    })?;
    array.to_vertex_data()
}
