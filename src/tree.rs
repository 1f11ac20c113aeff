//! Обобщённое дерево документа и безопасная навигация по путям.
//!
//! Соглашение повторяет распространённый формат XML → объект: каждый дочерний
//! элемент хранится в списке (даже единственный), текст элемента с атрибутами
//! лежит под ключом [`TEXT_KEY`], атрибуты под [`ATTR_KEY`]. Лист без атрибутов
//! представлен просто текстом. Корневой элемент, текст и атрибуты в список не
//! оборачиваются; до них добираются через [`Node::field`].

use std::collections::BTreeMap;

/// Ключ текстового содержимого элемента с атрибутами.
pub const TEXT_KEY: &str = "_";
/// Ключ атрибутов элемента.
pub const ATTR_KEY: &str = "$";

/// Узел обобщённого дерева.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Текстовое значение листа.
    Text(String),
    /// Упорядоченный список дочерних узлов.
    List(Vec<Self>),
    /// Отображение «имя поля → узел».
    Map(BTreeMap<String, Self>),
}

impl Node {
    /// Создаёт текстовый узел.
    #[inline]
    pub fn text_node(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Возвращает поле отображения, разворачивая список до первого элемента.
    ///
    /// Отсутствующий ключ, пустой список, значение не-список или сам узел
    /// не-отображение дают `None`.
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self.field(key)? {
            Self::List(items) => items.first(),
            _ => None,
        }
    }

    /// Значение поля отображения как есть, без разворачивания списка.
    pub fn field(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Проходит путь из ключей, на каждом шаге беря первый элемент списка.
    ///
    /// ```
    /// # use galgo_balance_csv::Node;
    /// # use std::collections::BTreeMap;
    /// let leaf = Node::List(vec![Node::text_node("42")]);
    /// let mut inner = BTreeMap::new();
    /// inner.insert("b".to_string(), leaf);
    /// let mut outer = BTreeMap::new();
    /// outer.insert("a".to_string(), Node::List(vec![Node::Map(inner)]));
    /// let root = Node::Map(outer);
    /// assert_eq!(root.get_path(&["a", "b"]).and_then(Node::text), Some("42"));
    /// assert!(root.get_path(&["a", "c"]).is_none());
    /// ```
    pub fn get_path(&self, path: &[&str]) -> Option<&Self> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Возвращает все элементы повторяющегося поля; пустой срез, если поля нет.
    pub fn list(&self, key: &str) -> &[Self] {
        match self.field(key) {
            Some(Self::List(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// Текст листа: сам текст или значение под [`TEXT_KEY`].
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Map(_) => self.field(TEXT_KEY).and_then(Self::text),
            Self::List(items) => items.first().and_then(Self::text),
        }
    }

    /// Значение атрибута элемента.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.field(ATTR_KEY)?.field(name)?.text()
    }

    /// Имена полей отображения в отсортированном порядке.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let map = match self {
            Self::Map(map) => Some(map),
            _ => None,
        };
        map.into_iter().flat_map(|m| m.keys().map(String::as_str))
    }
}
