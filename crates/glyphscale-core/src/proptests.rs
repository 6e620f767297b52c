use super::*;
use proptest::prelude::*;

fn color() -> impl Strategy<Value = Color> {
    any::<[u8; 4]>().prop_map(Color::from)
}

// Property: premultiplied output never has a channel brighter than its alpha
proptest! {
    #[test]
    fn prop_mask_output_is_premultiplied(coverage in proptest::collection::vec(any::<u8>(), 1..64), base in color()) {
        let image = Image {
            source: Source::Outline,
            content: Content::Mask,
            placement: Placement { left: 0, top: 0, width: coverage.len() as u32, height: 1 },
            data: coverage,
        };
        let out = to_rgba8(&image, base).unwrap();
        prop_assert_eq!(out.len(), image.data.len() * 4);
        for px in out.chunks_exact(4) {
            prop_assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
        }
    }
}

// Property: subpixel alpha follows the strongest channel
proptest! {
    #[test]
    fn prop_subpixel_alpha_tracks_max_channel(rgb in any::<[u8; 3]>(), base in color()) {
        let image = Image {
            source: Source::Outline,
            content: Content::SubpixelMask,
            placement: Placement { left: 0, top: 0, width: 1, height: 1 },
            data: rgb.to_vec(),
        };
        let out = to_rgba8(&image, base).unwrap();
        let max = rgb[0].max(rgb[1]).max(rgb[2]);
        prop_assert_eq!(out[3], image::mul_div255(max, base.a));
        prop_assert!(out[0] <= out[3] && out[1] <= out[3] && out[2] <= out[3]);
    }
}

// Property: straight RGBA bitmaps keep their alpha and shrink their color
proptest! {
    #[test]
    fn prop_rgba_bitmap_keeps_alpha(px in any::<[u8; 4]>()) {
        let image = Image {
            source: Source::EmbeddedImage(StrikeWith::BestFit),
            content: Content::Bitmap(BitmapFormat::Rgba8),
            placement: Placement { left: 0, top: 0, width: 1, height: 1 },
            data: px.to_vec(),
        };
        let out = to_rgba8(&image, Color::black()).unwrap();
        prop_assert_eq!(out[3], px[3]);
        prop_assert!(out[0] <= px[0] && out[1] <= px[1] && out[2] <= px[2]);
    }
}
