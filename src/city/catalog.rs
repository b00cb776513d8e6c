// src/city/catalog.rs
//! Справочники: товары и имена городов

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Товар, который можно забрать в городе
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Good {
    Coal,
    Iron,
    Oil,
    Wheat,
    Cattle,
    Wood,
    Fish,
    Copper,
    Cotton,
    Sugar,
    Wine,
    Cheese,
    Marble,
    Salt,
    Tobacco,
    Machinery,
}

impl Good {
    pub const ALL: [Good; 16] = [
        Good::Coal,
        Good::Iron,
        Good::Oil,
        Good::Wheat,
        Good::Cattle,
        Good::Wood,
        Good::Fish,
        Good::Copper,
        Good::Cotton,
        Good::Sugar,
        Good::Wine,
        Good::Cheese,
        Good::Marble,
        Good::Salt,
        Good::Tobacco,
        Good::Machinery,
    ];

    /// `count` различных товаров из каталога
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Good> {
        Self::ALL.choose_multiple(rng, count).copied().collect()
    }
}

const CITY_NAMES: &[&str] = &[
    "Ashford",
    "Brackwater",
    "Calder",
    "Dunmore",
    "Eastbrook",
    "Fairhaven",
    "Glenrock",
    "Harrowgate",
    "Ironbridge",
    "Juniper",
    "Kingsport",
    "Lindale",
    "Millbrook",
    "Northwick",
    "Oakridge",
    "Pinecrest",
    "Queensferry",
    "Redcliff",
    "Stonehaven",
    "Thornbury",
    "Upton",
    "Valemont",
    "Westmarch",
    "Yarrow",
];

/// Пул имён без повторов; после исчерпания `City {n}`
#[derive(Debug, Clone)]
pub struct NamePool {
    remaining: Vec<&'static str>,
    fallback_counter: usize,
}

impl NamePool {
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut remaining = CITY_NAMES.to_vec();
        remaining.shuffle(rng);
        Self {
            remaining,
            fallback_counter: 0,
        }
    }

    pub fn next_name(&mut self) -> String {
        if let Some(name) = self.remaining.pop() {
            name.to_string()
        } else {
            self.fallback_counter += 1;
            format!("City {}", self.fallback_counter)
        }
    }

    #[must_use]
    pub fn capacity() -> usize {
        CITY_NAMES.len()
    }
}
