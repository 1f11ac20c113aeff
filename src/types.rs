//! Доменные типы выписки и итоговая строка таблицы.

use rust_decimal::Decimal;
use serde::Serialize;

/// Денежное значение или количество, используем `Decimal` для точных расчётов.
pub type Money = Decimal;

/// Общие сведения о выписке (`StmtGnlDtls`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralDetails {
    /// Идентификатор выписки.
    pub statement_id: Option<String>,
    /// Дата выписки в исходном виде.
    pub statement_date: Option<String>,
}

/// Дополнительный идентификатор инструмента (`OthrId`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherIdentifier {
    /// Значение идентификатора.
    pub id: Option<String>,
    /// Проприетарный код типа (`Tp/Prtry`).
    pub proprietary_type: Option<String>,
}

/// Идентификация финансового инструмента (`FinInstrmId`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancialInstrument {
    /// Наименование фонда.
    pub description: Option<String>,
    /// ISIN.
    pub isin: Option<String>,
    /// Дополнительные идентификаторы в порядке документа.
    pub other_ids: Vec<OtherIdentifier>,
}

/// Цена позиции (`PricDtls`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceDetail {
    /// Код типа цены, например `NAVL`.
    pub type_code: Option<String>,
    /// Значение цены в исходном виде.
    pub amount: Option<String>,
}

/// Позиция по счёту (`BalForAcct`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    /// Инструмент.
    pub instrument: FinancialInstrument,
    /// Количество (`AggtBal/Qty/Qty/Unit`).
    pub quantity: Option<String>,
    /// Цены в порядке документа.
    pub prices: Vec<PriceDetail>,
    /// Стоимость позиции в базовой валюте (`AcctBaseCcyAmts/HldgVal/Amt`).
    pub holding_value: Option<String>,
}

/// Выписка остатков, разобранная в типизированную схему.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    /// Общие сведения.
    pub general: GeneralDetails,
    /// Позиции в порядке документа.
    pub positions: Vec<Position>,
    /// Итоговая стоимость активов выписки (`TtlHldgsValOfStmt/Amt`).
    pub total_holdings_value: Option<String>,
}

/// Строка итоговой таблицы: одна позиция выписки.
///
/// Все поля присутствуют всегда; отсутствующие данные заменяются пустой
/// строкой или нулём.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionRecord {
    /// Идентификатор выписки.
    pub identificador_arquivo: String,
    /// Дата выписки.
    pub data_arquivo: String,
    /// Наименование фонда.
    pub nome_fundo: String,
    /// ISIN.
    pub isin: String,
    /// CNPJ класса или фонда.
    pub cnpj: String,
    /// Количество паёв.
    #[serde(with = "rust_decimal::serde::str")]
    pub quantidade_cotas: Money,
    /// Стоимость пая (`NAVL`).
    #[serde(with = "rust_decimal::serde::str")]
    pub valor_cota: Money,
    /// Стоимость позиции.
    #[serde(with = "rust_decimal::serde::str")]
    pub valor_total_ativos: Money,
    /// Чистые активы выписки, одинаковые для всех строк.
    #[serde(with = "rust_decimal::serde::str")]
    pub patrimonio_liquido: Money,
}

impl PositionRecord {
    /// Заголовки столбцов в порядке полей.
    pub const HEADERS: [&'static str; 9] = [
        "identificador_arquivo",
        "data_arquivo",
        "nome_fundo",
        "isin",
        "cnpj",
        "quantidade_cotas",
        "valor_cota",
        "valor_total_ativos",
        "patrimonio_liquido",
    ];
}
