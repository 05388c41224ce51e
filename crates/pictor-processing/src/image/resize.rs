use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};
use pictor_core::{Fit, ResizeOptions};

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Bounding box for the requested dimensions.
    ///
    /// A missing side follows the source aspect ratio. `None` when neither
    /// side is given.
    pub fn bounding_box(
        orig_width: u32,
        orig_height: u32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Option<(u32, u32)> {
        match (width, height) {
            (Some(w), Some(h)) => Some((w, h)),
            (Some(w), None) => {
                let aspect_ratio = orig_height as f32 / orig_width as f32;
                let h = (w as f32 * aspect_ratio).round() as u32;
                Some((w, h.max(1)))
            }
            (None, Some(h)) => {
                let aspect_ratio = orig_width as f32 / orig_height as f32;
                let w = (h as f32 * aspect_ratio).round() as u32;
                Some((w.max(1), h))
            }
            (None, None) => None,
        }
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            imageops::FilterType::CatmullRom
        } else {
            imageops::FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }

    /// Scale to fit the box and centre on a white canvas of exactly the box size
    pub fn resize_with_fill(
        img: &DynamicImage,
        target_width: u32,
        target_height: u32,
    ) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();

        let scale_width = target_width as f32 / orig_width as f32;
        let scale_height = target_height as f32 / orig_height as f32;
        let (scaled_width, scaled_height) =
            Self::scaled(orig_width, orig_height, scale_width.min(scale_height));

        let bg_color = Rgba([255u8, 255u8, 255u8, 255u8]);
        let canvas_img = RgbaImage::from_pixel(target_width, target_height, bg_color);
        let mut canvas = DynamicImage::ImageRgba8(canvas_img);

        let x_offset = target_width.saturating_sub(scaled_width) / 2;
        let y_offset = target_height.saturating_sub(scaled_height) / 2;

        let resized = Self::resize_image(img, scaled_width, scaled_height);
        imageops::overlay(&mut canvas, &resized, x_offset as i64, y_offset as i64);

        canvas
    }

    /// Scale to cover the box, then crop the centre.
    pub fn resize_with_crop(
        img: &DynamicImage,
        target_width: u32,
        target_height: u32,
    ) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let scale = (target_width as f32 / orig_width as f32)
            .max(target_height as f32 / orig_height as f32);
        let (scaled_width, scaled_height) = Self::scaled(orig_width, orig_height, scale);
        let scaled_width = scaled_width.max(target_width);
        let scaled_height = scaled_height.max(target_height);

        let resized = Self::resize_image(img, scaled_width, scaled_height);
        let x = (scaled_width - target_width) / 2;
        let y = (scaled_height - target_height) / 2;
        resized.crop_imm(x, y, target_width, target_height)
    }

    fn scaled(width: u32, height: u32, scale: f32) -> (u32, u32) {
        (
            ((width as f32 * scale).round() as u32).max(1),
            ((height as f32 * scale).round() as u32).max(1),
        )
    }

    /// Apply a size entry's resize options.
    ///
    /// With `without_enlargement`, an image that would have to grow is
    /// returned unchanged.
    pub fn apply(img: &DynamicImage, options: &ResizeOptions) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let Some((box_width, box_height)) =
            Self::bounding_box(orig_width, orig_height, options.width, options.height)
        else {
            return img.clone();
        };

        let scale_x = box_width as f32 / orig_width as f32;
        let scale_y = box_height as f32 / orig_height as f32;
        let blocked = |scale: f32| options.without_enlargement && scale > 1.0;

        match options.fit {
            Fit::Fill => {
                if blocked(scale_x.max(scale_y)) {
                    img.clone()
                } else {
                    Self::resize_image(img, box_width, box_height)
                }
            }
            Fit::Inside => {
                let scale = scale_x.min(scale_y);
                if blocked(scale) {
                    return img.clone();
                }
                let (w, h) = Self::scaled(orig_width, orig_height, scale);
                Self::resize_image(img, w, h)
            }
            Fit::Outside => {
                let scale = scale_x.max(scale_y);
                if blocked(scale) {
                    return img.clone();
                }
                let (w, h) = Self::scaled(orig_width, orig_height, scale);
                Self::resize_image(img, w, h)
            }
            Fit::Cover => {
                if blocked(scale_x.max(scale_y)) {
                    img.clone()
                } else {
                    Self::resize_with_crop(img, box_width, box_height)
                }
            }
            Fit::Contain => {
                if blocked(scale_x.min(scale_y)) {
                    img.clone()
                } else {
                    Self::resize_with_fill(img, box_width, box_height)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])))
    }

    fn options(width: Option<u32>, height: Option<u32>, fit: Fit) -> ResizeOptions {
        ResizeOptions::new(width, height).with_fit(fit)
    }

    #[test]
    fn test_bounding_box_width_only() {
        // Height should maintain aspect ratio: 50/100 * 200 = 100
        assert_eq!(
            ImageResize::bounding_box(100, 50, Some(200), None),
            Some((200, 100))
        );
        assert_eq!(
            ImageResize::bounding_box(100, 50, None, Some(100)),
            Some((200, 100))
        );
        assert_eq!(ImageResize::bounding_box(100, 50, None, None), None);
    }

    #[test]
    fn test_resize_image() {
        let resized = ImageResize::resize_image(&solid(100, 100), 50, 50);
        assert_eq!(resized.dimensions(), (50, 50));
    }

    #[test]
    fn test_inside_preserves_aspect() {
        let resized = ImageResize::apply(&solid(200, 100), &options(Some(50), Some(50), Fit::Inside));
        assert_eq!(resized.dimensions(), (50, 25));
    }

    #[test]
    fn test_outside_covers_box() {
        let resized =
            ImageResize::apply(&solid(200, 100), &options(Some(50), Some(50), Fit::Outside));
        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn test_fill_stretches() {
        let resized = ImageResize::apply(&solid(200, 100), &options(Some(30), Some(60), Fit::Fill));
        assert_eq!(resized.dimensions(), (30, 60));
    }

    #[test]
    fn test_cover_crops_to_box() {
        let resized = ImageResize::apply(&solid(200, 100), &options(Some(40), Some(40), Fit::Cover));
        assert_eq!(resized.dimensions(), (40, 40));
    }

    #[test]
    fn test_contain_pads_to_box() {
        let resized =
            ImageResize::apply(&solid(200, 100), &options(Some(40), Some(40), Fit::Contain));
        assert_eq!(resized.dimensions(), (40, 40));
        // Padding is white, the scaled image sits in the middle band.
        let rgba = resized.to_rgba8();
        assert_eq!(rgba.get_pixel(20, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(rgba.get_pixel(20, 20), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_without_enlargement_keeps_small_images() {
        let img = solid(50, 50);
        let resized = ImageResize::apply(
            &img,
            &options(Some(100), Some(100), Fit::Inside).without_enlargement(),
        );
        assert_eq!(resized.dimensions(), (50, 50)); // Original size preserved

        // Downscaling should work
        let resized = ImageResize::apply(
            &img,
            &options(Some(25), None, Fit::Inside).without_enlargement(),
        );
        assert_eq!(resized.dimensions(), (25, 25));
    }

    #[test]
    fn test_upscaling_allowed_by_default() {
        let resized = ImageResize::apply(&solid(50, 50), &options(Some(100), None, Fit::Inside));
        assert_eq!(resized.dimensions(), (100, 100));
    }

    #[test]
    fn test_no_geometry_is_identity() {
        let resized = ImageResize::apply(&solid(64, 32), &ResizeOptions::default());
        assert_eq!(resized.dimensions(), (64, 32));
    }
}
