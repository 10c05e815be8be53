//! Static PNG heatmap of traffic volume.

use geo::{BoundingRect, Coord, MultiLineString};
use image::{Rgb, RgbImage};
use std::path::Path;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::export::color::{VolumeScale, reds};
use crate::graph::RoadGraph;

/// Output size in pixels (10in at 150dpi).
pub const IMAGE_SIZE: u32 = 1500;
const MARGIN: u32 = 60;
const LEGEND_WIDTH: u32 = 30;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([64, 64, 64]);

/// Maps lon/lat onto the drawing area, keeping the aspect ratio of an
/// equirectangular projection at the map's mid latitude.
struct Projection {
    min: Coord<f64>,
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    fn new(min: Coord<f64>, max: Coord<f64>, width: f64, height: f64) -> Self {
        let mid_lat = ((min.y + max.y) / 2.0).to_radians();
        let span_x = ((max.x - min.x) * mid_lat.cos()).max(f64::EPSILON);
        let span_y = (max.y - min.y).max(f64::EPSILON);
        let scale = (width / span_x).min(height / span_y);
        Self {
            min,
            scale_x: scale * mid_lat.cos(),
            scale_y: scale,
            offset_x: (width - span_x * scale) / 2.0,
            offset_y: (height - span_y * scale) / 2.0,
        }
    }

    /// Pixel position; y grows downwards.
    fn project(&self, c: Coord<f64>, height: f64) -> (i64, i64) {
        let x = self.offset_x + (c.x - self.min.x) * self.scale_x;
        let y = height - (self.offset_y + (c.y - self.min.y) * self.scale_y);
        (x.round() as i64 + MARGIN as i64, y.round() as i64 + MARGIN as i64)
    }
}

/// Renders every edge coloured by traffic volume, with a colour bar on the
/// right. Heavier edges are drawn last so they stay visible.
pub fn export_heatmap(graph: &RoadGraph, path: &Path) -> PipelineResult<()> {
    let mut views: Vec<_> = graph.segment_views().collect();
    let bounds = MultiLineString(views.iter().map(|v| v.geometry.clone()).collect())
        .bounding_rect()
        .ok_or_else(|| PipelineError::NoData("graph has no edges to draw".to_string()))?;

    let scale = VolumeScale::new(views.iter().map(|v| v.segment.traffic_or_default().traffic_volume));
    views.sort_by(|a, b| {
        a.segment
            .traffic_or_default()
            .traffic_volume
            .total_cmp(&b.segment.traffic_or_default().traffic_volume)
    });

    let mut img = RgbImage::from_pixel(IMAGE_SIZE, IMAGE_SIZE, BACKGROUND);
    let plot_width = (IMAGE_SIZE - 3 * MARGIN - LEGEND_WIDTH) as f64;
    let plot_height = (IMAGE_SIZE - 2 * MARGIN) as f64;
    let projection = Projection::new(bounds.min(), bounds.max(), plot_width, plot_height);

    for view in &views {
        let color = Rgb(reds(scale.unit(view.segment.traffic_or_default().traffic_volume)));
        for line in view.geometry.lines() {
            let from = projection.project(line.start, plot_height);
            let to = projection.project(line.end, plot_height);
            draw_line(&mut img, from, to, color);
        }
    }

    draw_legend(&mut img);
    img.save(path)?;

    info!(
        path = %path.display(),
        edges = views.len(),
        max_volume = scale.max(),
        "Heatmap exported"
    );
    Ok(())
}

/// Vertical colour bar, darkest at the top, framed in grey.
fn draw_legend(img: &mut RgbImage) {
    let x0 = IMAGE_SIZE - MARGIN - LEGEND_WIDTH;
    let y0 = MARGIN;
    let height = IMAGE_SIZE - 2 * MARGIN;
    for dy in 0..height {
        let t = 1.0 - dy as f64 / (height - 1) as f64;
        let color = Rgb(reds(t));
        for dx in 0..LEGEND_WIDTH {
            img.put_pixel(x0 + dx, y0 + dy, color);
        }
    }
    for dx in 0..LEGEND_WIDTH {
        img.put_pixel(x0 + dx, y0, FRAME);
        img.put_pixel(x0 + dx, y0 + height - 1, FRAME);
    }
    for dy in 0..height {
        img.put_pixel(x0, y0 + dy, FRAME);
        img.put_pixel(x0 + LEGEND_WIDTH - 1, y0 + dy, FRAME);
    }
}

/// Bresenham line, clipped to the image.
fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;
    loop {
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeTraffic, Intersection, RoadSegment};

    #[test]
    fn test_draw_line_endpoints() {
        let mut img = RgbImage::from_pixel(10, 10, BACKGROUND);
        let red = Rgb([255, 0, 0]);
        draw_line(&mut img, (1, 1), (8, 5), red);
        assert_eq!(*img.get_pixel(1, 1), red);
        assert_eq!(*img.get_pixel(8, 5), red);
        assert_eq!(*img.get_pixel(0, 9), BACKGROUND);
        // Out-of-bounds endpoints are clipped rather than panicking.
        draw_line(&mut img, (-5, -5), (20, 20), red);
    }

    #[test]
    fn test_export_heatmap() {
        let mut g = RoadGraph::new();
        g.add_intersection(Intersection::new(1, 77.60, 12.90));
        g.add_intersection(Intersection::new(2, 77.62, 12.92));
        g.add_intersection(Intersection::new(3, 77.64, 12.90));
        g.add_segment(
            1,
            2,
            RoadSegment {
                traffic: Some(EdgeTraffic {
                    traffic_volume: 100.0,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        g.add_segment(2, 3, RoadSegment::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        export_heatmap(&g, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (IMAGE_SIZE, IMAGE_SIZE));
        let legend_x = IMAGE_SIZE - MARGIN - LEGEND_WIDTH;
        assert!(
            img.enumerate_pixels()
                .any(|(x, _, p)| x < legend_x && *p == Rgb(reds(1.0)))
        );
    }

    #[test]
    fn test_empty_graph_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_heatmap(&RoadGraph::new(), &dir.path().join("x.png"));
        assert!(matches!(result, Err(PipelineError::NoData(_))));
    }
}
