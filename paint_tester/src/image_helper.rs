use image::{ImageEncoder, RgbaImage};
use std::io::BufWriter;
use std::path::Path;

pub fn load(path: &Path) -> Result<RgbaImage, image::error::ImageError> {
    Ok(image::open(path)?.to_rgba8())
}

pub fn save(path: &Path, image: &RgbaImage) -> Result<(), image::error::ImageError> {
    let output = BufWriter::new(std::fs::File::create(path)?);
    let encoder = image::codecs::png::PngEncoder::new(output);

    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn save_then_load_keeps_pixels() {
        let dir = std::env::temp_dir().join(format!("paint_tester_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("Error creating temp dir.");
        let path = dir.join("gradient.png");

        let image = RgbaImage::from_fn(7, 3, |x, y| Rgba([x as u8 * 30, y as u8 * 80, 5, 255]));
        save(&path, &image).expect("Error Saving File.");
        let loaded = load(&path).expect("Error Loading File.");

        assert_eq!(loaded, image);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load(Path::new("definitely/not/here.png")).is_err());
    }
}
