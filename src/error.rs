//! Ошибки чтения, разбора и выгрузки выписок.

/// Ошибка разбора выписки или записи результата.
#[derive(thiserror::Error, Debug)]
pub enum StatementError {
    /// Ошибка ввода-вывода при чтении исходного файла.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Ошибка синтаксиса XML.
    #[error("XML parsing error: {0}")]
    Xml(String),
    /// Ошибка записи CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// В документе нет ожидаемого элемента верхнего уровня.
    #[error("Element '{element}' not found")]
    StructureNotFound {
        /// Имя элемента, на котором оборвался путь.
        element: String,
    },
    /// Ошибка разбора числового значения.
    #[error("Invalid number '{value}' in field '{field}'")]
    Number {
        /// Некорректное исходное значение.
        value: String,
        /// Название поля.
        field: &'static str,
    },
}
