use anyhow::{anyhow, Result};

use std::fmt;
use std::str::FromStr;

/// One of the nine kinds of building a city tile can hold
///
/// The declaration order is the digit order used by the board codec and must
/// never change.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Tile {
    Factory,
    House,
    Office,
    Park,
    Shop,
    TavernBed,
    TavernDrink,
    TavernFood,
    TavernMusic,
}

impl Tile {
    /// Every tile kind, in codec digit order
    pub const ALL: [Tile; 9] = [
        Tile::Factory,
        Tile::House,
        Tile::Office,
        Tile::Park,
        Tile::Shop,
        Tile::TavernBed,
        Tile::TavernDrink,
        Tile::TavernFood,
        Tile::TavernMusic,
    ];

    /// The four tavern kinds, each scored as a distinct set member
    pub const TAVERNS: [Tile; 4] = [
        Tile::TavernBed,
        Tile::TavernDrink,
        Tile::TavernFood,
        Tile::TavernMusic,
    ];

    pub fn is_factory(self) -> bool {
        self == Tile::Factory
    }

    pub fn is_house(self) -> bool {
        self == Tile::House
    }

    pub fn is_office(self) -> bool {
        self == Tile::Office
    }

    pub fn is_park(self) -> bool {
        self == Tile::Park
    }

    pub fn is_shop(self) -> bool {
        self == Tile::Shop
    }

    pub fn is_tavern(self) -> bool {
        self.tavern_type().is_some()
    }

    /// Index of this tile in [`Tile::TAVERNS`], or `None` if it isn't a tavern
    pub fn tavern_type(self) -> Option<usize> {
        match self {
            Tile::TavernBed => Some(0),
            Tile::TavernDrink => Some(1),
            Tile::TavernFood => Some(2),
            Tile::TavernMusic => Some(3),
            _ => None,
        }
    }

    /// The codec digit of this tile (0-8)
    pub fn digit(self) -> u64 {
        self as u64
    }

    pub fn from_digit(digit: u64) -> Option<Self> {
        Self::ALL.get(digit as usize).copied()
    }

    /// Single letter code used for compact board strings
    pub fn to_char(self) -> char {
        match self {
            Tile::Factory => 'F',
            Tile::House => 'H',
            Tile::Office => 'O',
            Tile::Park => 'P',
            Tile::Shop => 'S',
            Tile::TavernBed => 'B',
            Tile::TavernDrink => 'D',
            // 'E' for eatery, 'F' is taken by factories
            Tile::TavernFood => 'E',
            Tile::TavernMusic => 'M',
        }
    }

    pub fn from_char(code: char) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tile| tile.to_char() == code.to_ascii_uppercase())
            .ok_or_else(|| anyhow!("could not parse '{}' as a tile code", code))
    }

    pub fn name(self) -> &'static str {
        match self {
            Tile::Factory => "FACTORY",
            Tile::House => "HOUSE",
            Tile::Office => "OFFICE",
            Tile::Park => "PARK",
            Tile::Shop => "SHOP",
            Tile::TavernBed => "TAVERN_BED",
            Tile::TavernDrink => "TAVERN_DRINK",
            Tile::TavernFood => "TAVERN_FOOD",
            Tile::TavernMusic => "TAVERN_MUSIC",
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Tile {
    type Err = anyhow::Error;

    /// Accepts full names (`TAVERN_BED`, `tavern-bed`), short tavern names
    /// (`bed`, `drink`, `food`, `music`) and single letter codes
    fn from_str(s: &str) -> Result<Self> {
        let normalised = s.trim().to_ascii_uppercase().replace('-', "_");
        if let Some(tile) = Self::ALL.iter().find(|tile| tile.name() == normalised) {
            return Ok(*tile);
        }
        match normalised.as_str() {
            "BED" => Ok(Tile::TavernBed),
            "DRINK" => Ok(Tile::TavernDrink),
            "FOOD" => Ok(Tile::TavernFood),
            "MUSIC" => Ok(Tile::TavernMusic),
            _ => {
                let mut chars = normalised.chars();
                match (chars.next(), chars.next()) {
                    (Some(code), None) => Self::from_char(code),
                    _ => Err(anyhow!("could not parse '{}' as a tile", s)),
                }
            }
        }
    }
}
