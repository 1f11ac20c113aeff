//! Разбор обобщённого дерева выписки в типизированную схему.

use crate::error::StatementError;
use crate::raw::StatementTree;
use crate::tree::Node;
use crate::types::{
    FinancialInstrument, GeneralDetails, OtherIdentifier, Position, PriceDetail, Statement,
};
use crate::utils::{date_part, document_prefix};

/// Корневой элемент конверта Galgo.
const ROOT_ELEMENT: &str = "GalgoAssBalStmt";
/// Бизнес-сообщение внутри конверта.
const BUSINESS_MESSAGE: &str = "BsnsMsg";

/// Пространство имён документа: квалифицирует локальные имена префиксом.
#[derive(Debug, Clone, Copy)]
struct Namespace<'a> {
    prefix: &'a str,
}

impl Namespace<'_> {
    fn qualify(self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{local}", self.prefix)
        }
    }

    fn get<'n>(self, node: &'n Node, local: &str) -> Option<&'n Node> {
        node.get(&self.qualify(local))
    }

    fn path<'n>(self, node: &'n Node, locals: &[&str]) -> Option<&'n Node> {
        locals
            .iter()
            .try_fold(node, |current, local| self.get(current, local))
    }

    fn text(self, node: &Node, locals: &[&str]) -> Option<String> {
        self.path(node, locals)
            .and_then(Node::text)
            .map(str::to_string)
    }

    fn list<'n>(self, node: &'n Node, local: &str) -> &'n [Node] {
        node.list(&self.qualify(local))
    }
}

impl Statement {
    /// Находит отчёт `SctiesBalAcctgRpt` в дереве и разбирает его за один проход.
    ///
    /// Ошибка возвращается только если не найден путь до самого отчёта;
    /// отсутствие отдельных полей внутри отчёта ошибкой не считается.
    pub fn from_tree(root: &Node) -> Result<Self, StatementError> {
        let (report, ns) = locate_report(root)?;

        let general = ns
            .get(report, "StmtGnlDtls")
            .map(|details| parse_general(details, ns))
            .unwrap_or_default();
        let positions = ns
            .list(report, "BalForAcct")
            .iter()
            .map(|position| parse_position(position, ns))
            .collect();
        let total_holdings_value = ns.text(
            report,
            &["AcctBaseCcyTtlAmts", "TtlHldgsValOfStmt", "Amt"],
        );

        Ok(Self {
            general,
            positions,
            total_holdings_value,
        })
    }
}

impl StatementTree {
    /// Типизированная выписка из разобранного дерева.
    #[inline]
    pub fn statement(&self) -> Result<Statement, StatementError> {
        Statement::from_tree(&self.root)
    }
}

/// Проходит `GalgoAssBalStmt/BsnsMsg/<ns>:Document/<ns>:SctiesBalAcctgRpt`.
fn locate_report(root: &Node) -> Result<(&Node, Namespace<'_>), StatementError> {
    let message = root
        .field(ROOT_ELEMENT)
        .ok_or_else(|| not_found(ROOT_ELEMENT))?
        .get(BUSINESS_MESSAGE)
        .ok_or_else(|| not_found(BUSINESS_MESSAGE))?;

    let (document_key, prefix) = message
        .keys()
        .find_map(|key| document_prefix(key).map(|prefix| (key, prefix)))
        .ok_or_else(|| not_found("Document"))?;
    let ns = Namespace { prefix };
    tracing::debug!(prefix, "resolved document namespace prefix");

    let document = message
        .get(document_key)
        .ok_or_else(|| not_found(document_key))?;
    let report = ns
        .get(document, "SctiesBalAcctgRpt")
        .ok_or_else(|| not_found(&ns.qualify("SctiesBalAcctgRpt")))?;
    Ok((report, ns))
}

fn not_found(element: &str) -> StatementError {
    StatementError::StructureNotFound {
        element: element.to_string(),
    }
}

fn parse_general(details: &Node, ns: Namespace) -> GeneralDetails {
    // Дата может прийти как Dt или как DtTm; из DtTm берём только дату.
    let statement_date = ns.text(details, &["StmtDtTm", "Dt"]).or_else(|| {
        ns.text(details, &["StmtDtTm", "DtTm"])
            .map(|raw| date_part(&raw).unwrap_or(raw))
    });
    GeneralDetails {
        statement_id: ns.text(details, &["StmtId"]),
        statement_date,
    }
}

fn parse_position(position: &Node, ns: Namespace) -> Position {
    let instrument = ns
        .get(position, "FinInstrmId")
        .map(|id| parse_instrument(id, ns))
        .unwrap_or_default();
    let prices = ns
        .list(position, "PricDtls")
        .iter()
        .map(|price| PriceDetail {
            type_code: ns.text(price, &["Tp", "Cd"]),
            amount: ns.text(price, &["Val", "Amt"]),
        })
        .collect();

    Position {
        instrument,
        quantity: ns.text(position, &["AggtBal", "Qty", "Qty", "Unit"]),
        prices,
        holding_value: ns.text(position, &["AcctBaseCcyAmts", "HldgVal", "Amt"]),
    }
}

fn parse_instrument(id: &Node, ns: Namespace) -> FinancialInstrument {
    let other_ids = ns
        .list(id, "OthrId")
        .iter()
        .map(|other| OtherIdentifier {
            id: ns.text(other, &["Id"]),
            proprietary_type: ns.text(other, &["Tp", "Prtry"]),
        })
        .collect();
    FinancialInstrument {
        description: ns.text(id, &["Desc"]),
        isin: ns.text(id, &["ISIN"]),
        other_ids,
    }
}
