//! GeoTIFF-backed DEM source using the native `tiff` decoder
//!
//! Reads the first band plus ModelPixelScale / ModelTiepoint georeferencing,
//! the GDAL no-data tag and the EPSG code from the GeoKey directory. The file
//! must already be in the analysis CRS; reprojection happens upstream.

use super::{crop_to_bounds, Bounds, DemSource};
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{ElevationGrid, GeoTransform};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// DEM stored in a single-band GeoTIFF on disk
#[derive(Debug, Clone)]
pub struct GeoTiffDem {
    path: PathBuf,
}

impl GeoTiffDem {
    /// Fails early when the file does not exist
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("DEM file not found: {}", path.display()),
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the whole file. `fallback_crs` is used when the file carries no EPSG key.
    pub fn read(&self, fallback_crs: &CRS) -> Result<ElevationGrid> {
        let file = BufReader::new(File::open(&self.path)?);
        decode_geotiff(file, fallback_crs)
    }
}

impl DemSource for GeoTiffDem {
    fn load_for_region(
        &self,
        bounds: Bounds,
        target_crs: &CRS,
        buffer_m: f64,
    ) -> Result<ElevationGrid> {
        tracing::info!("Loading DEM: {}", self.path.display());
        let grid = self.read(target_crs)?;
        crop_to_bounds(&grid, bounds, target_crs, buffer_m)
    }
}

fn decode_geotiff<R: Read + Seek>(reader: R, fallback_crs: &CRS) -> Result<ElevationGrid> {
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let nodata = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f64>().ok());

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let raw: Vec<f64> = match result {
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ));
        }
    };

    if raw.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let data: Vec<f64> = match nodata {
        Some(nd) => raw
            .into_iter()
            .map(|v| if (v - nd).abs() < 1e-6 { f64::NAN } else { v })
            .collect(),
        None => raw,
    };
    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    let transform = read_geotransform(&mut decoder)?;
    let crs = read_epsg(&mut decoder)
        .map(CRS::from_epsg)
        .unwrap_or_else(|| fallback_crs.clone());

    ElevationGrid::new(array, transform, crs)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::Other("Cannot determine geotransform".into()));
    }

    // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// EPSG code from the GeoKey directory, if one is stored inline
fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<u32> {
    let keys = decoder
        .get_tag_u16_vec(Tag::GeoKeyDirectoryTag)
        .ok()?;

    // Header is 4 shorts, then 4 shorts per key: id, location, count, value
    let mut geographic = None;
    for entry in keys.get(4..)?.chunks_exact(4) {
        let (id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 || value == 0 || value == 32767 {
            continue;
        }
        match id {
            PROJECTED_CS_TYPE_KEY => return Some(u32::from(value)),
            GEOGRAPHIC_TYPE_KEY => geographic = Some(u32::from(value)),
            _ => {}
        }
    }
    geographic
}

/// Write an elevation grid as a 32-bit float GeoTIFF (NaN no-data).
pub fn write_geotiff(grid: &ElevationGrid, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_geotiff(grid, file)
}

fn encode_geotiff<W: Write + Seek>(grid: &ElevationGrid, writer: W) -> Result<()> {
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = grid.shape();
    let data: Vec<f32> = grid.data().iter().map(|&v| v as f32).collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = grid.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    // GTModelType (projected or geographic), RasterPixelIsArea, plus the EPSG key
    let mut geokeys: Vec<u16> = vec![1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
    if let Some(code) = grid.crs().epsg().and_then(|c| u16::try_from(c).ok()) {
        let (model, key) = if grid.crs().is_geographic() {
            (2, GEOGRAPHIC_TYPE_KEY)
        } else {
            (1, PROJECTED_CS_TYPE_KEY)
        };
        geokeys[3] = 3;
        geokeys[7] = model;
        geokeys.extend_from_slice(&[key, 0, 1, code]);
    }
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
