//! Построение строк таблицы из позиций выписки.

use crate::error::StatementError;
use crate::raw::StatementTree;
use crate::tree::Node;
use crate::types::{GeneralDetails, Money, Position, PositionRecord, Statement};
use crate::utils::money_or_zero;
use rust_decimal::Decimal;

/// Код типа цены «стоимость пая».
pub const NAV_PRICE_CODE: &str = "NAVL";
/// Коды типов идентификатора с CNPJ в порядке приоритета.
pub const CNPJ_TYPES: [&str; 2] = ["CNPJCLASSE", "CNPJ"];
/// Идентификаторы позиций, количество которых всегда равно единице.
pub const UNIT_QUANTITY_IDS: [&str; 2] = ["CASH", "REAL"];

/// Извлекает строки таблицы из дерева выписки.
///
/// Если путь до отчёта не найден, пишет предупреждение в лог и возвращает
/// пустой список: конвертация деградирует до «нет строк», а не до ошибки.
pub fn extract(document: &Node) -> Vec<PositionRecord> {
    try_extract(document).unwrap_or_else(|err| {
        tracing::warn!(%err, "statement report not found, no rows extracted");
        Vec::new()
    })
}

/// То же, что [`extract`], но сообщает о ненайденной структуре ошибкой.
pub fn try_extract(document: &Node) -> Result<Vec<PositionRecord>, StatementError> {
    Ok(Statement::from_tree(document)?.records())
}

impl StatementTree {
    /// Строки таблицы; пустой список, если отчёт не найден.
    #[inline]
    pub fn records(&self) -> Vec<PositionRecord> {
        extract(self.root())
    }
}

impl Statement {
    /// По одной строке на позицию в порядке документа.
    pub fn records(&self) -> Vec<PositionRecord> {
        let net_asset_value = money_or_zero(
            self.total_holdings_value.as_deref(),
            "TtlHldgsValOfStmt",
        );
        let records: Vec<_> = self
            .positions
            .iter()
            .map(|position| position_record(position, &self.general, net_asset_value))
            .collect();
        tracing::debug!(rows = records.len(), "extracted statement positions");
        records
    }
}

impl Position {
    /// Стоимость пая: первая цена с типом `NAVL`.
    pub fn nav_price(&self) -> Option<&str> {
        self.prices
            .iter()
            .find(|price| price.type_code.as_deref() == Some(NAV_PRICE_CODE))
            .and_then(|price| price.amount.as_deref())
    }

    /// CNPJ: сначала `CNPJCLASSE`, затем `CNPJ`; в пределах типа берётся первое вхождение.
    pub fn cnpj(&self) -> Option<&str> {
        let other_ids = &self.instrument.other_ids;
        CNPJ_TYPES.iter().find_map(|code| {
            other_ids
                .iter()
                .find(|other| other.proprietary_type.as_deref() == Some(*code))
                .map(|other| other.id.as_deref().unwrap_or_default())
        })
    }

    /// Позиция в деньгах (`CASH`) или недвижимости (`REAL`).
    pub fn is_unit_quantity(&self) -> bool {
        self.instrument.other_ids.iter().any(|other| {
            other
                .id
                .as_deref()
                .is_some_and(|id| UNIT_QUANTITY_IDS.contains(&id))
        })
    }
}

fn position_record(
    position: &Position,
    general: &GeneralDetails,
    net_asset_value: Money,
) -> PositionRecord {
    let quantity = money_or_zero(position.quantity.as_deref(), "Unit");
    let unit_price = money_or_zero(position.nav_price(), "NAVL");
    let holding_value = money_or_zero(position.holding_value.as_deref(), "HldgVal");

    // Пустое или нулевое значение пересчитываем по количеству до подмены на 1.
    let total_value = if !holding_value.is_zero() {
        holding_value
    } else if !quantity.is_zero() && !unit_price.is_zero() {
        quantity.checked_mul(unit_price).unwrap_or_else(|| {
            tracing::warn!(%quantity, %unit_price, "holding value overflow, using zero");
            Decimal::ZERO
        })
    } else {
        Decimal::ZERO
    };

    let quantity = if position.is_unit_quantity() {
        Decimal::ONE
    } else {
        quantity
    };

    PositionRecord {
        identificador_arquivo: general.statement_id.clone().unwrap_or_default(),
        data_arquivo: general.statement_date.clone().unwrap_or_default(),
        nome_fundo: position.instrument.description.clone().unwrap_or_default(),
        isin: position.instrument.isin.clone().unwrap_or_default(),
        cnpj: position.cnpj().unwrap_or_default().to_string(),
        quantidade_cotas: quantity,
        valor_cota: unit_price,
        valor_total_ativos: total_value,
        patrimonio_liquido: net_asset_value,
    }
}
