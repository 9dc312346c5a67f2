//! Equirectangular overview rasterizer behind [`crate::World::capture_frame`].

use std::io::Cursor;

use foundation::math::{Ecef, Vec2, ecef_to_geodetic};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::components::Rgba8;
use crate::imagery::Basemap;
use crate::render::RenderError;
use crate::world::World;

/// Longitude jump above which a segment is treated as crossing the antimeridian.
const WRAP_THRESHOLD_PX_FRACTION: f64 = 0.5;

/// Map lon/lat degrees onto a `width` x `height` equirectangular canvas.
pub fn project(lon_deg: f64, lat_deg: f64, width: u32, height: u32) -> Vec2 {
    let x = (lon_deg + 180.0) / 360.0 * width as f64;
    let y = (90.0 - lat_deg) / 180.0 * height as f64;
    Vec2::new(x, y)
}

fn background(basemap: Basemap) -> Rgba8 {
    match basemap {
        Basemap::Satellite => Rgba8::rgb(0x1d, 0x2b, 0x3a),
        Basemap::Light => Rgba8::rgb(0xf5, 0xf4, 0xf2),
        Basemap::Dark => Rgba8::rgb(0x20, 0x22, 0x26),
        Basemap::Terrain => Rgba8::rgb(0xe4, 0xe0, 0xd0),
    }
}

pub fn rasterize(world: &World) -> RgbaImage {
    let viewport = world.viewport();
    let (width, height) = (viewport.width.max(1), viewport.height.max(1));
    let mut image = RgbaImage::from_pixel(width, height, Rgba(background(world.imagery()).0));
    let to_screen = |p: Ecef| {
        let geo = ecef_to_geodetic(p);
        project(geo.lon_deg(), geo.lat_deg(), width, height)
    };

    for (_, polyline) in world.visible_polylines() {
        let radius = (polyline.style.width_px as f64 / 2.0).max(0.5);
        let screen: Vec<Vec2> = polyline.positions.iter().map(|p| to_screen(*p)).collect();
        for pair in screen.windows(2) {
            if (pair[1].x - pair[0].x).abs() > width as f64 * WRAP_THRESHOLD_PX_FRACTION {
                continue;
            }
            stroke(&mut image, pair[0], pair[1], radius, polyline.style.color);
        }
    }

    for (_, position, point) in world.visible_points() {
        let center = to_screen(position);
        let radius = point.pixel_size as f64 / 2.0;
        disc(&mut image, center, radius + point.outline_width_px as f64, point.outline);
        disc(&mut image, center, radius, point.color);
    }

    for (_, position, billboard) in world.visible_billboards() {
        let center = to_screen(position);
        let radius = billboard.width_px.min(billboard.height_px) as f64 / 2.0;
        disc(&mut image, center, radius, Rgba8::WHITE.with_alpha(0.94));
        disc(&mut image, center, radius * 0.35, Rgba8::rgb(0xd7, 0xdb, 0xe2));
    }

    image
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|err| RenderError::Capture(err.to_string()))?;
    Ok(out.into_inner())
}

fn stroke(image: &mut RgbaImage, a: Vec2, b: Vec2, radius: f64, color: Rgba8) {
    let delta = b - a;
    let length = (delta.x * delta.x + delta.y * delta.y).sqrt();
    let steps = (length / radius.max(0.5)).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let p = Vec2::new(a.x + delta.x * t, a.y + delta.y * t);
        disc(image, p, radius, color);
    }
}

fn disc(image: &mut RgbaImage, center: Vec2, radius: f64, color: Rgba8) {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let min_x = ((center.x - radius).floor() as i64).max(0);
    let max_x = ((center.x + radius).ceil() as i64).min(w - 1);
    let min_y = ((center.y - radius).floor() as i64).max(0);
    let max_y = ((center.y + radius).ceil() as i64).min(h - 1);
    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            if dx * dx + dy * dy <= r2 {
                blend(image.get_pixel_mut(x as u32, y as u32), color);
            }
        }
    }
}

fn blend(dst: &mut Rgba<u8>, src: Rgba8) {
    let alpha = src.0[3] as u32;
    for c in 0..3 {
        let mixed = (src.0[c] as u32 * alpha + dst.0[c] as u32 * (255 - alpha)) / 255;
        dst.0[c] = mixed as u8;
    }
    dst.0[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::{project, rasterize};
    use crate::components::{PointStyle, Polyline, PolylineStyle, Rgba8};
    use crate::render::Renderer;
    use crate::world::{Viewport, World};
    use foundation::math::Geodetic;

    #[test]
    fn project_corners() {
        let top_left = project(-180.0, 90.0, 360, 180);
        assert_eq!((top_left.x, top_left.y), (0.0, 0.0));
        let bottom_right = project(180.0, -90.0, 360, 180);
        assert_eq!((bottom_right.x, bottom_right.y), (360.0, 180.0));
    }

    #[test]
    fn visible_point_is_painted() {
        let mut world = World::with_viewport(Viewport {
            width: 360,
            height: 180,
        });
        let red = Rgba8::rgb(255, 0, 0);
        world.add_marker(
            Geodetic::from_degrees(0.0, 0.0, 0.0).to_ecef(),
            PointStyle {
                color: red,
                ..PointStyle::default()
            },
            crate::components::Label::new("", Default::default()),
        );
        let image = rasterize(&world);
        assert_eq!(image.get_pixel(180, 90).0, red.0);
    }

    #[test]
    fn antimeridian_segments_are_skipped() {
        let mut world = World::with_viewport(Viewport {
            width: 360,
            height: 180,
        });
        let color = Rgba8::rgb(0, 0, 255);
        world.add_polyline(Polyline::new(
            vec![
                Geodetic::from_degrees(179.0, 0.0, 0.0).to_ecef(),
                Geodetic::from_degrees(-179.0, 0.0, 0.0).to_ecef(),
            ],
            PolylineStyle {
                color,
                ..PolylineStyle::default()
            },
        ));
        let image = rasterize(&world);
        assert_ne!(image.get_pixel(180, 90).0, color.0);
    }
}
