use {
    snafu::prelude::*,
    std::{fmt::Display, str::FromStr},
};

#[derive(Debug, Snafu, PartialEq)]
pub enum Error {
    #[snafu(display("unknown column type tag {}", tag))]
    InvalidTag { tag: u8 },

    #[snafu(display("unknown column type `{}`", name))]
    InvalidName { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Scalar type of a column. The discriminant is the tag stored in the metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColumnType {
    Int = 1,
    BigInt,
    Float,
    Datetime,
    Char,
}

impl ColumnType {
    /// Width of the type in bytes, `None` for types whose length is declared per column.
    pub const fn fixed_len(&self) -> Option<u32> {
        match self {
            Self::Int => Some(4),
            Self::BigInt | Self::Float | Self::Datetime => Some(8),
            Self::Char => None,
        }
    }

    pub const fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            1 => Self::Int,
            2 => Self::BigInt,
            3 => Self::Float,
            4 => Self::Datetime,
            5 => Self::Char,
            _ => return InvalidTagSnafu { tag }.fail(),
        })
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Int => "INT",
                Self::BigInt => "BIGINT",
                Self::Float => "FLOAT",
                Self::Datetime => "DATETIME",
                Self::Char => "CHAR",
            }
        )
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "int" | "integer" => Self::Int,
            "bigint" => Self::BigInt,
            "float" | "double" => Self::Float,
            "datetime" => Self::Datetime,
            "char" | "string" => Self::Char,
            _ => return InvalidNameSnafu { name: s }.fail(),
        })
    }
}
