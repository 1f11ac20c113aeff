//! Выгрузка строк таблицы в CSV.

use crate::error::StatementError;
use crate::types::PositionRecord;
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

/// Настройки выгрузки CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    delimiter: u8,
    header: bool,
}

impl CsvOptions {
    /// Разделитель `,` и строка заголовков.
    #[inline]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            header: true,
        }
    }

    /// Задаёт разделитель полей.
    ///
    /// # Пример
    ///
    /// ```
    /// # use galgo_balance_csv::{CsvOptions, write_csv};
    /// let mut out = Vec::new();
    /// write_csv(&mut out, &[], &CsvOptions::new().delimiter(b';')).unwrap();
    /// assert!(String::from_utf8(out).unwrap().starts_with("\"identificador_arquivo\";"));
    /// ```
    #[inline]
    pub const fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Включает или отключает строку заголовков.
    #[inline]
    pub const fn header(mut self, enabled: bool) -> Self {
        self.header = enabled;
        self
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Записывает строки в CSV.
///
/// Заголовок пишется даже без строк, так что пустая выписка даёт
/// корректную таблицу из одной строки заголовков. Нечисловые значения
/// берутся в кавычки, числа пишутся с исходной точностью.
pub fn write_csv<W: Write>(
    writer: W,
    records: &[PositionRecord],
    options: &CsvOptions,
) -> Result<(), StatementError> {
    let mut out = WriterBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);

    if options.header {
        out.write_record(PositionRecord::HEADERS)?;
    }
    for record in records {
        out.serialize(record)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn render(records: &[PositionRecord], options: &CsvOptions) -> String {
        let mut out = Vec::new();
        write_csv(&mut out, records, options).expect("write csv");
        String::from_utf8(out).expect("utf-8 csv")
    }

    const HEADER: &str = "\"identificador_arquivo\",\"data_arquivo\",\"nome_fundo\",\"isin\",\
                          \"cnpj\",\"quantidade_cotas\",\"valor_cota\",\"valor_total_ativos\",\
                          \"patrimonio_liquido\"\n";

    #[test]
    fn empty_input_gives_header_only() {
        assert_eq!(render(&[], &CsvOptions::default()), HEADER);
        assert_eq!(render(&[], &CsvOptions::new().header(false)), "");
    }

    #[test]
    fn quotes_text_and_keeps_numbers_bare() {
        let record = PositionRecord {
            identificador_arquivo: "S-1".into(),
            data_arquivo: "2024-05-31".into(),
            nome_fundo: "Fundo, \"A\"".into(),
            quantidade_cotas: Decimal::from(100),
            valor_cota: Decimal::from_str("10.5").unwrap(),
            valor_total_ativos: Decimal::from_str("1050.0").unwrap(),
            ..PositionRecord::default()
        };
        let csv = render(&[record], &CsvOptions::default());
        let row = csv.strip_prefix(HEADER).expect("header first");
        assert_eq!(
            row,
            "\"S-1\",\"2024-05-31\",\"Fundo, \"\"A\"\"\",\"\",\"\",100,10.5,1050.0,0\n"
        );
    }

    #[test]
    fn honours_custom_delimiter() {
        let record = PositionRecord {
            nome_fundo: "Caixa".into(),
            quantidade_cotas: Decimal::ONE,
            ..PositionRecord::default()
        };
        let csv = render(&[record], &CsvOptions::new().delimiter(b';').header(false));
        assert_eq!(csv, "\"\";\"\";\"Caixa\";\"\";\"\";1;0;0;0\n");
    }
}
