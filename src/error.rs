// src/error.rs
//! Ошибки ввода-вывода вокруг генератора
//!
//! Сама генерация доски не падает: нехватка места для озёр, городов или рек
//! гасится пропуском объекта. Ошибки возникают только на границе с файловой системой.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardGenError {
    #[error("ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("некорректная конфигурация TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("не удалось сериализовать доску: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("ошибка записи изображения: {0}")]
    Image(#[from] image::ImageError),

    #[error("буфер изображения {width}×{height} не создан")]
    ImageBuffer { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, BoardGenError>;
