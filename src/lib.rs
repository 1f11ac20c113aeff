#![warn(missing_docs)]
//! Библиотека для конвертации выписок остатков Galgo (`SctiesBalAcctgRpt`)
//! в плоскую таблицу: одна строка на позицию.

mod error;
mod extract;
mod parser;
mod raw;
mod statement_set;
mod tree;
mod types;
mod utils;
mod writer;

pub use crate::error::StatementError;
pub use crate::extract::{
    CNPJ_TYPES, NAV_PRICE_CODE, UNIT_QUANTITY_IDS, extract, try_extract,
};
pub use crate::raw::{RawStatement, StatementTree};
pub use crate::statement_set::{LoadedStatement, StatementSet};
pub use crate::tree::{ATTR_KEY, Node, TEXT_KEY};
pub use crate::types::*;
pub use crate::writer::{CsvOptions, write_csv};
