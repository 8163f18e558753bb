use crate::{Raster, ReliefError};
use geo::geometry::Coord;
use std::io::{self, Seek, Write};
use tiff::{
    encoder::{colortype::Gray64Float, TiffEncoder},
    tags::Tag,
};

/// Geographic WGS 84 (EPSG:4326) in degrees, pixel-is-area.
const WGS84_GEO_KEYS: [u16; 20] = [
    1, 1, 0, 4, // directory version, key revision, minor revision, key count
    1024, 0, 1, 2, // GTModelTypeGeoKey = geographic
    1025, 0, 1, 1, // GTRasterTypeGeoKey = pixel is area
    2048, 0, 1, 4326, // GeographicTypeGeoKey
    2054, 0, 1, 9102, // GeogAngularUnitsGeoKey = degree
];

/// Writes `elevations` as a single band 64-bit float GeoTIFF.
///
/// `top_left` is the corner of the first pixel of the first row, so
/// `elevations` must already be north-up. A GDAL nodata tag marks NaN
/// cells when there are any.
pub fn write_geotiff<W: Write + Seek>(
    w: W,
    elevations: &Raster<f64>,
    top_left: Coord<f64>,
    pixel_size: f64,
) -> Result<(), ReliefError> {
    let (rows, cols) = elevations.dimensions();
    let (width, height) = match (u32::try_from(cols), u32::try_from(rows)) {
        (Ok(width), Ok(height)) => (width, height),
        _ => {
            return Err(ReliefError::InvalidParameter(format!(
                "{rows}x{cols} raster exceeds TIFF limits"
            )))
        }
    };

    let mut encoder = TiffEncoder::new(w)?;
    let mut image = encoder.new_image::<Gray64Float>(width, height)?;
    image.encoder().write_tag(
        Tag::ModelPixelScaleTag,
        &[pixel_size, pixel_size, 0.0][..],
    )?;
    image.encoder().write_tag(
        Tag::ModelTiepointTag,
        &[0.0, 0.0, 0.0, top_left.x, top_left.y, 0.0][..],
    )?;
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &WGS84_GEO_KEYS[..])?;
    if elevations.as_slice().iter().any(|v| v.is_nan()) {
        image.encoder().write_tag(Tag::GdalNodata, "nan")?;
    }
    image.write_data(elevations.as_slice())?;
    Ok(())
}

/// Writes the ESRI world file that accompanies a GeoTIFF.
///
/// The last two lines locate the center of the top-left pixel.
pub fn write_world_file<W: Write>(mut w: W, top_left: Coord<f64>, pixel_size: f64) -> io::Result<()> {
    writeln!(w, "{pixel_size}")?;
    writeln!(w, "0")?;
    writeln!(w, "0")?;
    writeln!(w, "{}", -pixel_size)?;
    writeln!(w, "{}", top_left.x + pixel_size / 2.0)?;
    writeln!(w, "{}", top_left.y - pixel_size / 2.0)?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::{write_geotiff, write_world_file, WGS84_GEO_KEYS};
    use crate::Raster;
    use approx::assert_relative_eq;
    use geo::geometry::Coord;
    use std::io::Cursor;
    use tiff::{
        decoder::{Decoder, DecodingResult},
        tags::Tag,
    };

    const TOP_LEFT: Coord<f64> = Coord { x: 1.441, y: 43.5675 };

    #[test]
    fn test_geotiff_layout() {
        let raster = Raster::new(2, 3, vec![199.0, 190.5, 185.0, 152.0, 160.0, 171.5]);
        let mut buf = Cursor::new(Vec::new());
        write_geotiff(&mut buf, &raster, TOP_LEFT, 0.001).unwrap();
        let bytes = buf.into_inner();
        assert_eq!(&bytes[..4], b"II*\0");

        let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (3, 2));
        let scale = decoder
            .get_tag_f64_vec(Tag::ModelPixelScaleTag)
            .unwrap();
        assert_relative_eq!(scale[0], 0.001);
        let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).unwrap();
        assert_relative_eq!(tiepoint[3], TOP_LEFT.x);
        assert_relative_eq!(tiepoint[4], TOP_LEFT.y);
        assert_eq!(
            decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).unwrap(),
            WGS84_GEO_KEYS.to_vec()
        );
        assert!(decoder.find_tag(Tag::GdalNodata).unwrap().is_none());
        match decoder.read_image().unwrap() {
            DecodingResult::F64(cells) => assert_eq!(cells, raster.into_vec()),
            _ => panic!("expected f64 samples"),
        }
    }

    #[test]
    fn test_geotiff_nodata_tag() {
        let raster = Raster::new(1, 2, vec![150.0, f64::NAN]);
        let mut buf = Cursor::new(Vec::new());
        write_geotiff(&mut buf, &raster, TOP_LEFT, 0.001).unwrap();
        let mut decoder = Decoder::new(Cursor::new(buf.into_inner())).unwrap();
        assert_eq!(
            decoder.get_tag_ascii_string(Tag::GdalNodata).unwrap(),
            "nan"
        );
    }

    #[test]
    fn test_world_file() {
        let mut buf = Vec::new();
        write_world_file(&mut buf, Coord { x: 1.0, y: 43.5 }, 0.5).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "0.5\n0\n0\n-0.5\n1.25\n43.25\n"
        );
    }
}
