// src/preview.rs
//! PNG-превью доски
//!
//! Отладочная картинка в масштабе 1 пиксель на единицу поля: море, суша, озёра,
//! реки, майлпосты (горы темнее) и города. К игровому слою отрисовки отношения
//! не имеет.

use crate::board::Board;
use crate::city::CitySize;
use crate::error::{BoardGenError, Result};
use crate::geometry::{Point, unique_vertices};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use std::path::Path;

const SEA: [u8; 3] = [28, 58, 110];
const LAND: [u8; 3] = [196, 186, 150];
const LAKE: [u8; 3] = [64, 120, 190];
const RIVER: Rgb<u8> = Rgb([40, 96, 200]);
const PLAIN: Rgb<u8> = Rgb([90, 90, 90]);
const MOUNTAIN: Rgb<u8> = Rgb([120, 70, 40]);
const CITY: Rgb<u8> = Rgb([200, 30, 30]);

fn image_size(board: &Board) -> (u32, u32) {
    (
        board.config.width.ceil().max(1.0) as u32,
        board.config.height.ceil().max(1.0) as u32,
    )
}

/// Закрашивает многоугольник; вырожденные контуры пропускаются
fn fill_polygon(img: &mut RgbImage, polygon: &[Point], color: [u8; 3]) {
    let mut corners: Vec<imageproc::point::Point<i32>> = unique_vertices(polygon)
        .iter()
        .map(|p| imageproc::point::Point::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    corners.dedup();
    // draw_polygon_mut не принимает замкнутый контур
    while corners.len() > 1 && corners.first() == corners.last() {
        corners.pop();
    }
    if corners.len() >= 3 {
        draw_polygon_mut(img, &corners, Rgb(color));
    }
}

fn draw_polyline(img: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    for s in points.windows(2) {
        draw_line_segment_mut(
            img,
            (s[0].x as f32, s[0].y as f32),
            (s[1].x as f32, s[1].y as f32),
            color,
        );
    }
}

/// Рисует доску в RGB-буфер
pub fn render_board(board: &Board) -> Result<RgbImage> {
    let (width, height) = image_size(board);
    let background: Vec<u8> = std::iter::repeat_n(SEA, (width * height) as usize)
        .flatten()
        .collect();
    let mut img: RgbImage = ImageBuffer::from_raw(width, height, background)
        .ok_or(BoardGenError::ImageBuffer { width, height })?;

    fill_polygon(&mut img, &board.boundary, LAND);
    draw_polyline(&mut img, &board.boundary, Rgb([60, 50, 40]));
    for lake in &board.lakes {
        fill_polygon(&mut img, &lake.outline, LAKE);
    }
    for river in &board.rivers {
        draw_polyline(&mut img, &river.points, RIVER);
    }

    for m in board.mileposts.iter().filter(|m| !m.is_city()) {
        let color = if m.is_mountain { MOUNTAIN } else { PLAIN };
        let radius = if m.is_mountain { 3 } else { 1 };
        draw_filled_circle_mut(
            &mut img,
            (m.point.x.round() as i32, m.point.y.round() as i32),
            radius,
            color,
        );
    }

    for city in &board.cities {
        let radius = match city.size {
            CitySize::Major => 5,
            CitySize::Medium => 4,
            CitySize::Small => 3,
        };
        for p in &city.anchor_points {
            draw_filled_circle_mut(&mut img, (p.x.round() as i32, p.y.round() as i32), radius, CITY);
        }
    }

    Ok(img)
}

/// Сохраняет превью доски в PNG-файл
///
/// # Ошибки
/// - буфер изображения не создан (некорректные размеры поля)
/// - файл не записан
pub fn save_board_png(board: &Board, path: impl AsRef<Path>) -> Result<()> {
    let img = render_board(board)?;
    img.save(path)?;
    tracing::info!(width = img.width(), height = img.height(), "превью сохранено");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::generate_board;
    use crate::config::BoardConfig;

    #[test]
    fn preview_matches_board_size_and_shows_land() {
        let config = BoardConfig {
            seed: Some(3),
            width: 400.0,
            height: 300.0,
            ..BoardConfig::default()
        };
        let board = generate_board(&config);
        let img = render_board(&board).expect("превью");

        assert_eq!(img.dimensions(), (400, 300));
        assert_eq!(img.get_pixel(0, 0), &Rgb(SEA));
        assert_ne!(img.get_pixel(200, 150), &Rgb(SEA));
    }

    #[test]
    fn closed_and_degenerate_polygons_are_safe() {
        let mut img = RgbImage::new(20, 20);
        let square = [
            Point::new(2.0, 2.0),
            Point::new(10.0, 2.0),
            Point::new(10.0, 10.0),
            Point::new(2.0, 2.0),
        ];
        fill_polygon(&mut img, &square, LAND);
        fill_polygon(&mut img, &[Point::new(1.0, 1.0), Point::new(1.2, 1.1)], LAND);
        assert_eq!(img.get_pixel(8, 4), &Rgb(LAND));
    }
}
