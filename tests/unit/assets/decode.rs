use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_is_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, ForgeError::Decode(_)));
}

#[test]
fn stretched_solid_image_fills_target_square() {
    let buf = png_bytes(3, 2, [255, 0, 0, 255]);
    let prepared = decode_image_stretched(&buf, 8, ResizeFilter::Nearest).unwrap();
    assert_eq!((prepared.width, prepared.height), (8, 8));
    assert_eq!(prepared.rgba8_premul.len(), 8 * 8 * 4);
    assert!(
        prepared
            .rgba8_premul
            .chunks_exact(4)
            .all(|px| px == [255, 0, 0, 255])
    );
}

#[test]
fn stretched_same_size_is_passthrough() {
    let buf = png_bytes(4, 4, [0, 0, 255, 255]);
    let prepared = decode_image_stretched(&buf, 4, ResizeFilter::Triangle).unwrap();
    assert_eq!((prepared.width, prepared.height), (4, 4));
    assert_eq!(&prepared.rgba8_premul[..4], &[0, 0, 255, 255]);
}
