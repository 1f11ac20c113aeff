//! Пакетная обработка каталога выписок.

use crate::error::StatementError;
use crate::raw::{RawStatement, StatementTree};
use crate::types::PositionRecord;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

/// Одна выписка из каталога вместе с путём к файлу.
#[derive(Debug, Clone)]
pub struct LoadedStatement {
    /// Путь к исходному файлу.
    pub path: PathBuf,
    /// Строки таблицы; пустые, если в файле нет отчёта.
    pub records: Vec<PositionRecord>,
}

/// Набор выписок, загруженных из каталога.
#[derive(Debug, Clone, Default)]
pub struct StatementSet {
    /// Выписки в порядке путей.
    pub statements: Vec<LoadedStatement>,
}

impl StatementSet {
    /// Загружает и конвертирует все XML-файлы каталога.
    ///
    /// Битый XML прерывает загрузку с ошибкой; файл без отчёта даёт ноль строк.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, StatementError> {
        let mut entries: Vec<_> = fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .collect();
        // Делаем порядок файлов детерминированным.
        entries.sort_by_key(DirEntry::path);

        let mut statements = Vec::new();
        for entry in entries {
            let path = entry.path();
            if !path.is_file() || !has_xml_extension(&path) {
                continue;
            }

            let raw = RawStatement::from_reader(fs::File::open(&path)?)?;
            let tree = StatementTree::parse(&raw).map_err(|err| match err {
                StatementError::Xml(msg) => {
                    StatementError::Xml(format!("{}: {msg}", path.display()))
                }
                other => other,
            })?;
            let records = tree.records();
            tracing::info!(path = %path.display(), rows = records.len(), "converted statement");
            statements.push(LoadedStatement { path, records });
        }

        Ok(Self { statements })
    }

    /// Все строки всех выписок подряд.
    pub fn records(&self) -> impl Iterator<Item = &PositionRecord> {
        self.statements.iter().flat_map(|s| s.records.iter())
    }
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}
