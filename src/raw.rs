//! Исходный XML выписки и его разбор в обобщённое дерево.

use crate::error::StatementError;
use crate::tree::{ATTR_KEY, Node, TEXT_KEY};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use std::io::Read;

/// Исходный XML выписки без разбора.
#[derive(Debug, Clone)]
pub struct RawStatement {
    /// Полный текст XML.
    pub xml: String,
}

impl RawStatement {
    /// Читает XML-выписку из произвольного `Read`.
    ///
    /// Ошибкой считается только сбой чтения; кодировка разбирается
    /// в [`RawStatement::from_bytes`].
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, StatementError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Декодирует байты выписки.
    ///
    /// Кодировка берётся из BOM, затем из атрибута `encoding` XML-декларации,
    /// иначе UTF-8. Недекодируемые байты заменяются на U+FFFD.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let encoding = declared_encoding(bytes).unwrap_or(UTF_8);
        let (xml, used, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::warn!(
                encoding = used.name(),
                "statement has undecodable bytes, replaced with U+FFFD"
            );
        }
        Self {
            xml: xml.into_owned(),
        }
    }

    /// Создаёт выписку из готовой XML-строки.
    #[inline]
    pub fn from_str(s: &str) -> Self {
        Self { xml: s.to_string() }
    }
}

/// Выписка, разобранная в обобщённое дерево.
///
/// Корень является отображением с единственным ключом, именем корневого элемента;
/// сам корневой элемент в список не оборачивается.
#[derive(Debug, Clone)]
pub struct StatementTree {
    pub(crate) root: Node,
}

impl StatementTree {
    /// Разбирает XML в дерево.
    pub fn parse(raw: &RawStatement) -> Result<Self, StatementError> {
        Ok(Self {
            root: decode_xml(&raw.xml)?,
        })
    }

    /// Корневой узел дерева.
    #[inline]
    pub const fn root(&self) -> &Node {
        &self.root
    }
}

/// Незакрытый элемент, накапливающий атрибуты, детей и текст.
#[derive(Debug)]
struct Frame {
    name: String,
    attrs: BTreeMap<String, Node>,
    children: BTreeMap<String, Vec<Node>>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart) -> Result<Self, StatementError> {
        let mut attrs = BTreeMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?;
            attrs.insert(key, Node::text_node(value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            children: BTreeMap::new(),
            text: String::new(),
        })
    }

    fn close(self) -> (String, Node) {
        let text = self.text.trim();
        let node = if self.children.is_empty() && self.attrs.is_empty() {
            Node::text_node(text)
        } else {
            let mut map: BTreeMap<String, Node> = self
                .children
                .into_iter()
                .map(|(name, items)| (name, Node::List(items)))
                .collect();
            if !self.attrs.is_empty() {
                map.insert(ATTR_KEY.to_string(), Node::Map(self.attrs));
            }
            if !text.is_empty() {
                map.insert(TEXT_KEY.to_string(), Node::text_node(text));
            }
            Node::Map(map)
        };
        (self.name, node)
    }
}

/// Декодирует XML-текст в обобщённое дерево.
fn decode_xml(xml: &str) -> Result<Node, StatementError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    loop {
        let closed = match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                ensure_single_root(root.as_ref())?;
                stack.push(Frame::open(&start)?);
                None
            }
            Event::Empty(start) => {
                ensure_single_root(root.as_ref())?;
                Some(Frame::open(&start)?.close())
            }
            Event::End(_) => stack.pop().map(Frame::close),
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                push_text(&mut stack, &text)?;
                None
            }
            Event::CData(data) => {
                let data = data.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&data))?;
                None
            }
            Event::Eof => break,
            // Декларация, комментарии, PI и DOCTYPE на дерево не влияют.
            _ => None,
        };

        if let Some((name, node)) = closed {
            match stack.last_mut() {
                Some(parent) => parent.children.entry(name).or_default().push(node),
                None => root = Some((name, node)),
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(StatementError::Xml(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    let (name, node) = root.ok_or_else(|| StatementError::Xml("no root element".into()))?;
    Ok(Node::Map(BTreeMap::from([(name, node)])))
}

/// Кодировка из XML-декларации, если она есть и известна.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    loop {
        match reader.read_event().ok()? {
            Event::Decl(decl) => {
                let label = decl.encoding()?.ok()?;
                return Encoding::for_label(&label);
            }
            Event::Start(_) | Event::Empty(_) | Event::Eof => return None,
            _ => {}
        }
    }
}

fn ensure_single_root(root: Option<&(String, Node)>) -> Result<(), StatementError> {
    match root {
        Some((name, _)) => Err(StatementError::Xml(format!(
            "unexpected element after root <{name}>"
        ))),
        None => Ok(()),
    }
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<(), StatementError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(StatementError::Xml(format!(
            "text outside of root element: '{}'",
            text.trim()
        ))),
    }
}

fn xml_error<E: std::fmt::Display>(err: E) -> StatementError {
    StatementError::Xml(err.to_string())
}
