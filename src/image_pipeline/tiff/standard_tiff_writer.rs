use std::io::Write;
use tracing::debug;
use crate::image_pipeline::common::error::{Result, PipelineError};
use crate::image_pipeline::debayer::types::ColorImage;
use crate::image_pipeline::tiff::types::{TiffCompression, TiffOptions};
use crate::image_pipeline::tiff::writer::TiffWriter;

pub struct StandardTiffWriter;

fn encoder_compression(compression: TiffCompression) -> tiff::encoder::Compression {
    use tiff::encoder::compression::DeflateLevel;
    match compression {
        TiffCompression::None => tiff::encoder::Compression::Uncompressed,
        TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
        TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(DeflateLevel::Balanced),
        TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(DeflateLevel::Best),
    }
}

impl TiffWriter for StandardTiffWriter {
    fn write_rgb_tiff(&self, image: &ColorImage, output: &mut dyn Write, options: &TiffOptions) -> Result<()> {
        debug!("Encoding RGB16 TIFF image: {}x{}", image.width, image.height);

        if image.bits_per_sample != 16 {
            return Err(PipelineError::BitDepthMismatch { expected: 16, actual: image.bits_per_sample });
        }
        let width = u32::try_from(image.width)
            .map_err(|_| PipelineError::InvalidDimensions(image.width, image.height))?;
        let height = u32::try_from(image.height)
            .map_err(|_| PipelineError::InvalidDimensions(image.width, image.height))?;

        // TiffEncoder needs Seek, so encode into memory first.
        let mut buffer = Vec::new();

        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(encoder_compression(options.compression));

        if let Some(predictor_val) = options.predictor {
            let predictor = match predictor_val {
                2 => tiff::tags::Predictor::Horizontal,
                _ => tiff::tags::Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        encoder.write_image::<tiff::encoder::colortype::RGB16>(
            width,
            height,
            &image.data,
        ).map_err(|e| PipelineError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tiff::decoder::{Decoder, DecodingResult};

    fn image(width: usize, height: usize) -> ColorImage {
        ColorImage {
            width,
            height,
            data: (0..width * height * 3).map(|i| (i * 1000) as u16).collect(),
            bits_per_sample: 16,
        }
    }

    #[test]
    fn writes_readable_rgb16() {
        let img = image(4, 2);
        let mut out = Vec::new();
        StandardTiffWriter
            .write_rgb_tiff(&img, &mut out, &TiffOptions::default())
            .unwrap();

        let mut decoder = Decoder::new(Cursor::new(out)).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (4, 2));
        match decoder.read_image().unwrap() {
            DecodingResult::U16(data) => assert_eq!(data, img.data),
            other => panic!("unexpected sample type: {:?}", std::mem::discriminant(&other)),
        }
    }

    #[test]
    fn compressed_output_round_trips() {
        let img = image(16, 8);
        let options = TiffOptions { compression: TiffCompression::DeflateBalanced, predictor: Some(2) };
        let mut out = Vec::new();
        StandardTiffWriter.write_rgb_tiff(&img, &mut out, &options).unwrap();

        let mut decoder = Decoder::new(Cursor::new(out)).unwrap();
        assert!(matches!(decoder.read_image().unwrap(), DecodingResult::U16(data) if data == img.data));
    }

    #[test]
    fn refuses_unscaled_samples() {
        let mut img = image(2, 2);
        img.bits_per_sample = 10;
        let err = StandardTiffWriter
            .write_rgb_tiff(&img, &mut Vec::new(), &TiffOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::BitDepthMismatch { expected: 16, actual: 10 }));
    }
}
