use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba(f(x, y)));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn entry(layer: usize, variant: usize, source: &VariantSource) -> StackEntry<'_> {
    StackEntry {
        layer,
        variant,
        source,
    }
}

#[test]
fn later_layers_cover_earlier_where_opaque() {
    let background =
        VariantSource::from_bytes("blue.png", png_bytes(4, 4, |_, _| [0, 0, 255, 255]));
    // Left half opaque red, right half transparent.
    let overlay = VariantSource::from_bytes(
        "half.png",
        png_bytes(4, 4, |x, _| if x < 2 { [255, 0, 0, 255] } else { [0, 0, 0, 0] }),
    );

    let mut comp = RasterCompositor::new(ResizeFilter::Nearest);
    comp.begin_run(4).unwrap();
    let raster = comp
        .compose(&[entry(0, 0, &background), entry(1, 0, &overlay)], 4)
        .unwrap();

    assert_eq!((raster.width, raster.height), (4, 4));
    assert_eq!(raster.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(raster.pixel(3, 3), Some([0, 0, 255, 255]));
    assert_eq!(raster.pixel(4, 0), None);
}

#[test]
fn variants_are_stretched_to_output_size() {
    let tiny = VariantSource::from_bytes("dot.png", png_bytes(1, 1, |_, _| [10, 20, 30, 255]));
    let mut comp = RasterCompositor::new(ResizeFilter::Nearest);
    comp.begin_run(16).unwrap();
    let raster = comp.compose(&[entry(0, 0, &tiny)], 16).unwrap();
    assert_eq!(raster.rgba8.len(), 16 * 16 * 4);
    assert!(raster.rgba8.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
}

#[test]
fn empty_stack_is_transparent() {
    let mut comp = RasterCompositor::default();
    let raster = comp.compose(&[], 2).unwrap();
    assert_eq!(raster.rgba8, vec![0u8; 16]);
}

#[test]
fn decoded_variants_are_cached_per_run() {
    let a = VariantSource::from_bytes("a.png", png_bytes(2, 2, |_, _| [1, 2, 3, 255]));
    let b = VariantSource::from_bytes("b.png", png_bytes(2, 2, |_, _| [4, 5, 6, 255]));
    let mut comp = RasterCompositor::new(ResizeFilter::Nearest);
    comp.begin_run(2).unwrap();
    comp.compose(&[entry(0, 0, &a)], 2).unwrap();
    comp.compose(&[entry(0, 0, &a)], 2).unwrap();
    comp.compose(&[entry(0, 1, &b)], 2).unwrap();
    assert_eq!(comp.cached_variants(), 2);

    comp.begin_run(2).unwrap();
    assert_eq!(comp.cached_variants(), 0);
}

#[test]
fn cache_respects_byte_budget() {
    let a = VariantSource::from_bytes("a.png", png_bytes(2, 2, |_, _| [1, 2, 3, 255]));
    let b = VariantSource::from_bytes("b.png", png_bytes(2, 2, |_, _| [4, 5, 6, 255]));

    // Room for exactly one 2x2 variant.
    let mut comp = RasterCompositor::new(ResizeFilter::Nearest).with_cache_budget(2 * 2 * 4);
    comp.begin_run(2).unwrap();
    comp.compose(&[entry(0, 0, &a)], 2).unwrap();
    let raster = comp.compose(&[entry(0, 1, &b)], 2).unwrap();
    assert_eq!(comp.cached_variants(), 1);
    assert_eq!(comp.cached_bytes(), 16);
    assert_eq!(raster.pixel(1, 1), Some([4, 5, 6, 255]));

    let mut uncached = RasterCompositor::new(ResizeFilter::Nearest).with_cache_budget(0);
    uncached.begin_run(2).unwrap();
    let first = uncached.compose(&[entry(0, 0, &a)], 2).unwrap();
    let again = uncached.compose(&[entry(0, 0, &a)], 2).unwrap();
    assert_eq!(uncached.cached_variants(), 0);
    assert_eq!(first, again);
}

#[test]
fn undecodable_variant_names_the_file() {
    let bad = VariantSource::from_bytes("broken.png", b"nope".to_vec());
    let mut comp = RasterCompositor::default();
    let err = comp.compose(&[entry(0, 0, &bad)], 2).unwrap_err();
    assert!(matches!(err, ForgeError::Decode(_)));
    assert!(err.to_string().contains("broken.png"));
}
