//! CLI enum types.

use clap::ValueEnum;

use crate::view::Filter;

/// Visual filter preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Original,
    Grayscale,
    Blur,
}

impl From<FilterArg> for Filter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::Original => Filter::Original,
            FilterArg::Grayscale => Filter::Grayscale,
            FilterArg::Blur => Filter::Blur,
        }
    }
}
