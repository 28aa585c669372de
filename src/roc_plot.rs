// src/roc_plot.rs
//
// ROC chart rendering. FAR runs along x, TPR up y, both on [0, 1]. The
// curve is drawn dashed through every threshold in sweep order with a dot
// at each point; the notable points get their own marker, a threshold tag
// next to the marker, and a legend entry.
//
// Drawing goes through OpenCV's imgproc primitives on a BGR canvas, which
// is converted to RGB and written as PNG with the `image` crate.

#![cfg_attr(not(feature = "render"), allow(dead_code))]

use crate::roc::NotableKind;

/// Pixel geometry of the plot area inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub width: i32,
    pub height: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
}

impl PlotLayout {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width as i32;
        let height = height as i32;
        Self {
            width,
            height,
            margin_left: (width / 10).max(60),
            margin_right: (width / 20).max(30),
            margin_top: (height / 10).max(60),
            margin_bottom: (height / 10).max(60),
        }
    }

    pub fn plot_width(&self) -> i32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn plot_height(&self) -> i32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Maps (FAR, TPR) to canvas pixels. Rates outside [0, 1] are clamped.
    pub fn to_pixel(&self, far: f64, tpr: f64) -> (i32, i32) {
        let far = far.clamp(0.0, 1.0);
        let tpr = tpr.clamp(0.0, 1.0);
        let x = self.margin_left as f64 + far * self.plot_width() as f64;
        let y = (self.height - self.margin_bottom) as f64 - tpr * self.plot_height() as f64;
        (x.round() as i32, y.round() as i32)
    }
}

/// Splits the segment p0→p1 into dash pieces of `dash` px separated by
/// `gap` px. A segment shorter than one dash comes back whole.
pub fn dash_segments(
    p0: (f64, f64),
    p1: (f64, f64),
    dash: f64,
    gap: f64,
) -> Vec<((f64, f64), (f64, f64))> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= dash || dash <= 0.0 {
        return vec![(p0, p1)];
    }

    let (ux, uy) = (dx / length, dy / length);
    let mut pieces = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        pieces.push((
            (p0.0 + ux * start, p0.1 + uy * start),
            (p0.0 + ux * end, p0.1 + uy * end),
        ));
        start = end + gap;
    }
    pieces
}

fn tag_offset(kind: NotableKind) -> (i32, i32) {
    // Stagger tags so coincident points stay readable.
    match kind {
        NotableKind::ClosestToIdeal => (14, 22),
        NotableKind::FirstZeroFalseAlarm => (14, 42),
        NotableKind::LastPerfectRecall => (14, 62),
        NotableKind::MinTotalError => (14, 82),
    }
}

#[cfg(feature = "render")]
pub use render::render_roc_chart;

#[cfg(feature = "render")]
mod render {
    use anyhow::{Context, Result};
    use opencv::{
        core::{self, Mat, Point, Rect, Scalar},
        imgproc,
        prelude::*,
    };
    use std::path::Path;
    use tracing::{debug, info};

    use super::{dash_segments, tag_offset, PlotLayout};
    use crate::roc::{NotableKind, SweepResult};

    /// Colors (BGR format for OpenCV).
    mod colors {
        use opencv::core::Scalar;

        pub const WHITE: Scalar = Scalar::new(255.0, 255.0, 255.0, 0.0);
        pub const BLACK: Scalar = Scalar::new(0.0, 0.0, 0.0, 0.0);
        pub const GRID_GREY: Scalar = Scalar::new(225.0, 225.0, 225.0, 0.0);
        pub const CHANCE_GREY: Scalar = Scalar::new(170.0, 170.0, 170.0, 0.0);
        pub const CURVE_BLUE: Scalar = Scalar::new(180.0, 119.0, 31.0, 0.0);
        pub const PURPLE: Scalar = Scalar::new(128.0, 0.0, 128.0, 0.0);
        pub const GREEN: Scalar = Scalar::new(44.0, 160.0, 44.0, 0.0);
        pub const ORANGE: Scalar = Scalar::new(14.0, 127.0, 255.0, 0.0);
        pub const RED: Scalar = Scalar::new(40.0, 39.0, 214.0, 0.0);
    }

    const FONT: i32 = imgproc::FONT_HERSHEY_SIMPLEX;

    fn style(kind: NotableKind) -> (Scalar, i32) {
        match kind {
            NotableKind::ClosestToIdeal => (colors::PURPLE, imgproc::MARKER_SQUARE),
            NotableKind::FirstZeroFalseAlarm => (colors::GREEN, imgproc::MARKER_DIAMOND),
            NotableKind::LastPerfectRecall => (colors::ORANGE, imgproc::MARKER_TRIANGLE_UP),
            NotableKind::MinTotalError => (colors::RED, imgproc::MARKER_TILTED_CROSS),
        }
    }

    fn pt((x, y): (i32, i32)) -> Point {
        Point::new(x, y)
    }

    pub fn render_roc_chart(result: &SweepResult, layout: &PlotLayout, path: &Path) -> Result<()> {
        let mut canvas =
            Mat::new_rows_cols_with_default(layout.height, layout.width, core::CV_8UC3, colors::WHITE)?;

        draw_axes(&mut canvas, layout)?;
        draw_curve(&mut canvas, layout, result)?;
        draw_notable_points(&mut canvas, layout, result)?;

        save_png(&canvas, path)?;
        info!("📈 ROC chart saved to {}", path.display());
        Ok(())
    }

    fn put_text(canvas: &mut Mat, text: &str, org: Point, scale: f64, color: Scalar) -> Result<()> {
        imgproc::put_text(canvas, text, org, FONT, scale, color, 1, imgproc::LINE_AA, false)?;
        Ok(())
    }

    fn text_width(text: &str, scale: f64) -> Result<i32> {
        let mut baseline = 0;
        let size = imgproc::get_text_size(text, FONT, scale, 1, &mut baseline)?;
        Ok(size.width)
    }

    fn draw_axes(canvas: &mut Mat, layout: &PlotLayout) -> Result<()> {
        // Grid and tick labels every 0.1
        for i in 0..=10 {
            let v = i as f64 / 10.0;
            let (x, bottom) = layout.to_pixel(v, 0.0);
            let (_, top) = layout.to_pixel(v, 1.0);
            let (left, y) = layout.to_pixel(0.0, v);
            let (right, _) = layout.to_pixel(1.0, v);

            imgproc::line(canvas, Point::new(x, top), Point::new(x, bottom), colors::GRID_GREY, 1, imgproc::LINE_8, 0)?;
            imgproc::line(canvas, Point::new(left, y), Point::new(right, y), colors::GRID_GREY, 1, imgproc::LINE_8, 0)?;

            let label = format!("{:.1}", v);
            let w = text_width(&label, 0.45)?;
            put_text(canvas, &label, Point::new(x - w / 2, bottom + 20), 0.45, colors::BLACK)?;
            put_text(canvas, &label, Point::new(left - w - 8, y + 5), 0.45, colors::BLACK)?;
        }

        // Chance diagonal
        imgproc::line(
            canvas,
            pt(layout.to_pixel(0.0, 0.0)),
            pt(layout.to_pixel(1.0, 1.0)),
            colors::CHANCE_GREY,
            1,
            imgproc::LINE_AA,
            0,
        )?;

        let (x0, y0) = layout.to_pixel(0.0, 0.0);
        imgproc::rectangle(
            canvas,
            Rect::new(x0, y0 - layout.plot_height(), layout.plot_width(), layout.plot_height()),
            colors::BLACK,
            1,
            imgproc::LINE_8,
            0,
        )?;

        let title = "Receiver Operating Characteristic Curve for Threshold Speeds";
        let title_scale = 0.6;
        let w = text_width(title, title_scale)?;
        put_text(canvas, title, Point::new((layout.width - w) / 2, layout.margin_top / 2), title_scale, colors::BLACK)?;

        let x_label = "False Alarm Rate";
        let w = text_width(x_label, 0.55)?;
        put_text(
            canvas,
            x_label,
            Point::new(layout.margin_left + (layout.plot_width() - w) / 2, y0 + 45),
            0.55,
            colors::BLACK,
        )?;

        put_text(
            canvas,
            "True Positive Rate",
            Point::new(8, layout.margin_top - 12),
            0.55,
            colors::BLACK,
        )?;

        Ok(())
    }

    fn draw_curve(canvas: &mut Mat, layout: &PlotLayout, result: &SweepResult) -> Result<()> {
        let pixels: Vec<(i32, i32)> = result
            .points
            .iter()
            .map(|p| layout.to_pixel(p.false_alarm_rate, p.true_positive_rate))
            .collect();

        for w in pixels.windows(2) {
            let a = (w[0].0 as f64, w[0].1 as f64);
            let b = (w[1].0 as f64, w[1].1 as f64);
            for (s, e) in dash_segments(a, b, 8.0, 5.0) {
                imgproc::line(
                    canvas,
                    Point::new(s.0.round() as i32, s.1.round() as i32),
                    Point::new(e.0.round() as i32, e.1.round() as i32),
                    colors::CURVE_BLUE,
                    2,
                    imgproc::LINE_AA,
                    0,
                )?;
            }
        }

        for &p in &pixels {
            imgproc::circle(canvas, pt(p), 4, colors::CURVE_BLUE, -1, imgproc::LINE_AA, 0)?;
        }

        debug!("Drew {} curve points", pixels.len());
        Ok(())
    }

    fn draw_notable_points(canvas: &mut Mat, layout: &PlotLayout, result: &SweepResult) -> Result<()> {
        let entries = result.notable.entries();

        for &(kind, point) in &entries {
            let (color, marker) = style(kind);
            let (x, y) = layout.to_pixel(point.false_alarm_rate, point.true_positive_rate);
            imgproc::draw_marker(canvas, Point::new(x, y), color, marker, 18, 2, imgproc::LINE_AA)?;

            let (dx, dy) = tag_offset(kind);
            let tag = format!("{} mph", point.threshold);
            let tx = (x + dx).min(layout.width - text_width(&tag, 0.45)? - 4);
            let ty = (y + dy).min(layout.height - 4);
            put_text(canvas, &tag, Point::new(tx, ty), 0.45, color)?;
        }

        // Legend in the lower right of the plot area, where ROC curves
        // rarely pass.
        let line_height = 22;
        let legend: Vec<String> = entries
            .iter()
            .map(|(kind, point)| format!("{} ({} mph)", kind.label(), point.threshold))
            .collect();
        let mut widest = 0;
        for text in &legend {
            widest = widest.max(text_width(text, 0.45)?);
        }
        let box_w = widest + 44;
        let box_h = line_height * legend.len() as i32 + 10;
        let (right, bottom) = layout.to_pixel(1.0, 0.0);
        let origin = Point::new(right - box_w - 10, bottom - box_h - 10);

        if !legend.is_empty() {
            imgproc::rectangle(
                canvas,
                Rect::new(origin.x, origin.y, box_w, box_h),
                colors::WHITE,
                -1,
                imgproc::LINE_8,
                0,
            )?;
            imgproc::rectangle(
                canvas,
                Rect::new(origin.x, origin.y, box_w, box_h),
                colors::CHANCE_GREY,
                1,
                imgproc::LINE_8,
                0,
            )?;
        }

        for (i, ((kind, _), text)) in entries.iter().zip(&legend).enumerate() {
            let (color, marker) = style(*kind);
            let row_y = origin.y + 5 + line_height * i as i32 + line_height / 2;
            imgproc::draw_marker(canvas, Point::new(origin.x + 16, row_y), color, marker, 12, 2, imgproc::LINE_AA)?;
            put_text(canvas, text, Point::new(origin.x + 32, row_y + 5), 0.45, color)?;
        }

        Ok(())
    }

    fn save_png(canvas: &Mat, path: &Path) -> Result<()> {
        use image::{ImageBuffer, RgbImage};

        let mut rgb = Mat::default();
        imgproc::cvt_color(canvas, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let data = rgb.data_bytes()?.to_vec();

        let img: RgbImage = ImageBuffer::from_raw(width, height, data)
            .context("Canvas buffer does not match its dimensions")?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        img.save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_map_to_plot_area() {
        let layout = PlotLayout::new(900, 900);
        assert_eq!(layout.to_pixel(0.0, 0.0), (layout.margin_left, 900 - layout.margin_bottom));
        assert_eq!(layout.to_pixel(1.0, 1.0), (900 - layout.margin_right, layout.margin_top));
    }

    #[test]
    fn test_rates_are_clamped() {
        let layout = PlotLayout::new(600, 400);
        assert_eq!(layout.to_pixel(-0.5, 1.5), layout.to_pixel(0.0, 1.0));
    }

    #[test]
    fn test_higher_tpr_is_higher_on_canvas() {
        let layout = PlotLayout::new(600, 600);
        let (_, low) = layout.to_pixel(0.3, 0.2);
        let (_, high) = layout.to_pixel(0.3, 0.8);
        assert!(high < low);
    }

    #[test]
    fn test_dash_segments_cover_line_with_gaps() {
        let pieces = dash_segments((0.0, 0.0), (30.0, 0.0), 8.0, 5.0);
        // dashes start at 0, 13, 26
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], ((0.0, 0.0), (8.0, 0.0)));
        assert_eq!(pieces[1].0, (13.0, 0.0));
        assert_eq!(pieces[2].1, (30.0, 0.0));
    }

    #[test]
    fn test_short_segment_is_whole() {
        let pieces = dash_segments((0.0, 0.0), (3.0, 4.0), 8.0, 5.0);
        assert_eq!(pieces, vec![((0.0, 0.0), (3.0, 4.0))]);
    }

    #[test]
    fn test_tags_do_not_collide() {
        let kinds = [
            NotableKind::ClosestToIdeal,
            NotableKind::FirstZeroFalseAlarm,
            NotableKind::LastPerfectRecall,
            NotableKind::MinTotalError,
        ];
        let mut offsets: Vec<i32> = kinds.iter().map(|&k| tag_offset(k).1).collect();
        offsets.dedup();
        assert_eq!(offsets.len(), 4);
    }
}
