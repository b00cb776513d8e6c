// src/config.rs
//! Конфигурация генерации доски
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией доски:
//! - Размеры поля и шаги гексагональной сетки майлпостов
//! - Форму границы континента
//! - Количество и размеры озёр
//! - Число крупных городов (средние и малые выводятся из него)
//! - Параметры прокладки рек
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.
//! Значения заранее не проверяются: запрос «слишком многого» просто даёт более редкую доску.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

/// Настройки границы континента
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundarySettings {
    /// Количество точек контура (по умолчанию 120)
    #[serde(default = "default_boundary_points")]
    pub num_points: usize,

    /// Целевая доля площади поля, занятая континентом (разумный диапазон 0.5–0.65)
    #[serde(default = "default_area_ratio")]
    pub area_ratio: f64,
}

fn default_boundary_points() -> usize {
    120
}
fn default_area_ratio() -> f64 {
    0.6
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            num_points: 120,
            area_ratio: 0.6,
        }
    }
}

/// Настройки озёр
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LakeSettings {
    /// Желаемое количество озёр
    #[serde(default = "default_lake_count")]
    pub count: usize,

    /// Минимальный базовый радиус озера
    #[serde(default = "default_min_radius")]
    pub min_radius: f64,

    /// Максимальный базовый радиус озера
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,

    /// Количество точек контура озера
    #[serde(default = "default_lake_points")]
    pub num_points: usize,

    /// Сила шума контура (0.0 = окружность)
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f64,

    /// Отступ от границы континента; `None` → `2 * horizontal_spacing`
    #[serde(default)]
    pub buffer_distance: Option<f64>,

    /// Минимальное расстояние между озёрами
    #[serde(default = "default_min_lake_distance")]
    pub min_lake_distance: f64,

    /// Попыток на одно озеро
    #[serde(default = "default_lake_attempts")]
    pub max_attempts: usize,
}

fn default_lake_count() -> usize {
    3
}
fn default_min_radius() -> f64 {
    30.0
}
fn default_max_radius() -> f64 {
    80.0
}
fn default_lake_points() -> usize {
    32
}
fn default_noise_scale() -> f64 {
    0.5
}
fn default_min_lake_distance() -> f64 {
    20.0
}
fn default_lake_attempts() -> usize {
    50
}

impl Default for LakeSettings {
    fn default() -> Self {
        Self {
            count: 3,
            min_radius: 30.0,
            max_radius: 80.0,
            num_points: 32,
            noise_scale: 0.5,
            buffer_distance: None,
            min_lake_distance: 20.0,
            max_attempts: 50,
        }
    }
}

/// Настройки городов
///
/// Задаётся только число крупных городов `M`; средних и малых всегда по `3M`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CitySettings {
    #[serde(default = "default_major_count")]
    pub major_count: usize,
}

fn default_major_count() -> usize {
    2
}

impl Default for CitySettings {
    fn default() -> Self {
        Self { major_count: 2 }
    }
}

/// Настройки рек
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiverSettings {
    /// Желаемое количество рек
    #[serde(default = "default_river_count")]
    pub count: usize,

    /// Длина одного шага роста
    #[serde(default = "default_segment_length")]
    pub segment_length: f64,

    /// Радиус запретной зоны вокруг каждого майлпоста
    #[serde(default = "default_milepost_buffer_radius")]
    pub milepost_buffer_radius: f64,

    /// Длина перпендикуляра, на котором ищется обход препятствия
    #[serde(default = "default_perpendicular_length")]
    pub perpendicular_length: f64,

    /// Случайных точек на перпендикуляре до отката к дальнему концу
    #[serde(default = "default_diversion_attempts")]
    pub diversion_attempts: usize,

    /// Предел шагов роста одной реки
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Попыток (старт, финиш, рост) на одну реку
    #[serde(default = "default_river_attempts")]
    pub max_attempts: usize,

    /// Случайных внутренних кандидатов в истоки
    #[serde(default = "default_interior_candidates")]
    pub interior_candidates: usize,

    /// Расстояние до финиша, считающееся прибытием
    #[serde(default = "default_arrival_epsilon")]
    pub arrival_epsilon: f64,

    /// Пересечения с границей ближе этого к финишу не считаются обрывом реки
    #[serde(default = "default_boundary_exclusion")]
    pub boundary_exclusion: f64,

    /// Шагов «отхода» от озера после истока
    #[serde(default = "default_departure_steps")]
    pub departure_steps: usize,

    /// Внутренний угол вершины (рад), ниже которого поворот смягчается
    #[serde(default = "default_sharp_angle_threshold")]
    pub sharp_angle_threshold: f64,

    /// Амплитуда меандра
    #[serde(default = "default_meander_intensity")]
    pub meander_intensity: f64,

    /// Частота меандра (периодов на всю реку)
    #[serde(default = "default_meander_frequency")]
    pub meander_frequency: f64,

    /// Сила локального сглаживания Безье
    #[serde(default = "default_smoothness")]
    pub smoothness: f64,
}

fn default_river_count() -> usize {
    5
}
fn default_segment_length() -> f64 {
    8.0
}
fn default_milepost_buffer_radius() -> f64 {
    4.0
}
fn default_perpendicular_length() -> f64 {
    20.0
}
fn default_diversion_attempts() -> usize {
    20
}
fn default_max_iterations() -> usize {
    1000
}
fn default_river_attempts() -> usize {
    10
}
fn default_interior_candidates() -> usize {
    50
}
fn default_arrival_epsilon() -> f64 {
    0.5
}
fn default_boundary_exclusion() -> f64 {
    1.0
}
fn default_departure_steps() -> usize {
    3
}
fn default_sharp_angle_threshold() -> f64 {
    PI * 0.7 // ~126°
}
fn default_meander_intensity() -> f64 {
    3.0
}
fn default_meander_frequency() -> f64 {
    0.3
}
fn default_smoothness() -> f64 {
    0.2
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            count: default_river_count(),
            segment_length: default_segment_length(),
            milepost_buffer_radius: default_milepost_buffer_radius(),
            perpendicular_length: default_perpendicular_length(),
            diversion_attempts: default_diversion_attempts(),
            max_iterations: default_max_iterations(),
            max_attempts: default_river_attempts(),
            interior_candidates: default_interior_candidates(),
            arrival_epsilon: default_arrival_epsilon(),
            boundary_exclusion: default_boundary_exclusion(),
            departure_steps: default_departure_steps(),
            sharp_angle_threshold: default_sharp_angle_threshold(),
            meander_intensity: default_meander_intensity(),
            meander_frequency: default_meander_frequency(),
            smoothness: default_smoothness(),
        }
    }
}

/// Основные параметры генерации доски
///
/// Полная конфигурация для генерации одной доски. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    /// Сид генератора случайных чисел; `None` означает случайную доску
    #[serde(default)]
    pub seed: Option<u64>,

    /// Ширина поля (по умолчанию 1600)
    #[serde(default = "default_width")]
    pub width: f64,

    /// Высота поля (по умолчанию 1200)
    #[serde(default = "default_height")]
    pub height: f64,

    /// Шаг рядов сетки майлпостов
    #[serde(default = "default_vertical_spacing")]
    pub vertical_spacing: f64,

    /// Шаг столбцов сетки майлпостов
    #[serde(default = "default_horizontal_spacing")]
    pub horizontal_spacing: f64,

    /// Вероятность того, что обычный майлпост окажется горным
    #[serde(default = "default_mountain_density")]
    pub mountain_density: f64,

    #[serde(default)]
    pub boundary: BoundarySettings,

    #[serde(default)]
    pub lakes: LakeSettings,

    #[serde(default)]
    pub cities: CitySettings,

    #[serde(default)]
    pub rivers: RiverSettings,
}

impl BoardConfig {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # board.toml
    /// seed = 42
    /// width = 1200
    /// height = 1200
    ///
    /// [lakes]
    /// count = 4
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Отступ озёр от границы
    #[must_use]
    pub fn buffer_distance(&self) -> f64 {
        self.lakes
            .buffer_distance
            .unwrap_or(2.0 * self.horizontal_spacing)
    }

    #[must_use]
    pub fn medium_count(&self) -> usize {
        self.cities.major_count * 3
    }

    #[must_use]
    pub fn small_count(&self) -> usize {
        self.cities.major_count * 3
    }

    /// Минимальное расстояние между якорями разных городов
    #[must_use]
    pub fn city_spacing(&self) -> f64 {
        2.0 * self.horizontal_spacing
    }

    /// Минимальное расстояние внутреннего истока реки до границы
    #[must_use]
    pub fn river_boundary_clearance(&self) -> f64 {
        2.0 * self.horizontal_spacing
    }
}

fn default_width() -> f64 {
    1600.0
}
fn default_height() -> f64 {
    1200.0
}
fn default_vertical_spacing() -> f64 {
    10.0
}
fn default_horizontal_spacing() -> f64 {
    35.0
}
fn default_mountain_density() -> f64 {
    0.05
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            seed: None,
            width: 1600.0,
            height: 1200.0,
            vertical_spacing: 10.0,
            horizontal_spacing: 35.0,
            mountain_density: 0.05,
            boundary: BoundarySettings::default(),
            lakes: LakeSettings::default(),
            cities: CitySettings::default(),
            rivers: RiverSettings::default(),
        }
    }
}
