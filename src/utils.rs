//! Вспомогательные парсеры чисел, дат и пространств имён.

use crate::error::StatementError;
use crate::types::Money;
use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// Нормализует числовую строку, удаляя пробелы, знак плюса итд.
fn normalize_number(input: &str) -> String {
    input
        .chars()
        .filter(|ch| !matches!(*ch, ' ' | '\u{a0}' | '\u{202f}' | '+'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Разбирает денежное значение, трактуя пустую строку как ноль.
///
/// Перед разбором удаляются пробелы (в том числе неразрывные, которыми
/// разделяют разряды) и знак `+`: `"1 050.25"` даёт `1050.25`, а
/// `"+1 234.57"` даёт `1234.57`. В остальном разбор строгий: допускается
/// только десятичная запись с точкой (или экспоненциальная), запятая как
/// разделитель не принимается.
pub fn parse_money_or_zero(value: &str, field: &'static str) -> Result<Money, StatementError> {
    let normalized = normalize_number(value);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| StatementError::Number {
            value: value.trim().to_string(),
            field,
        })
}

/// Разбирает необязательное значение; отсутствие и мусор дают ноль.
pub fn money_or_zero(value: Option<&str>, field: &'static str) -> Money {
    let Some(value) = value else {
        return Decimal::ZERO;
    };
    parse_money_or_zero(value, field).unwrap_or_else(|err| {
        tracing::warn!(%err, "treating unparsable amount as zero");
        Decimal::ZERO
    })
}

/// Дата из отметки времени ISO 8601 в формате `YYYY-MM-DD`.
pub fn date_part(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date().format("%Y-%m-%d").to_string())
}

static DOCUMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:([^:]+):)?Document$").expect("valid document regex"));

/// Префикс пространства имён элемента `Document`.
///
/// `Some("")` для элемента без префикса, `None`, если имя не `Document`.
pub fn document_prefix(name: &str) -> Option<&str> {
    DOCUMENT_RE
        .captures(name)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
}
