use galgo_balance_csv::{
    Money, Node, RawStatement, StatementError, StatementTree, extract, try_extract,
};
use std::collections::BTreeMap;

/// Собирает выписку из фрагментов `BalForAcct`.
fn statement_xml(positions: &[String], total: Option<&str>) -> String {
    let total = total.map_or_else(String::new, |amt| {
        format!(
            "<ns3:AcctBaseCcyTtlAmts><ns3:TtlHldgsValOfStmt>\
             <ns3:Amt Ccy=\"BRL\">{amt}</ns3:Amt>\
             </ns3:TtlHldgsValOfStmt></ns3:AcctBaseCcyTtlAmts>"
        )
    });
    format!(
        "<GalgoAssBalStmt xmlns:ns3=\"urn:x\"><BsnsMsg><ns3:Document><ns3:SctiesBalAcctgRpt>\
         <ns3:StmtGnlDtls><ns3:StmtId>S1</ns3:StmtId>\
         <ns3:StmtDtTm><ns3:Dt>2024-01-31</ns3:Dt></ns3:StmtDtTm></ns3:StmtGnlDtls>\
         {}{total}\
         </ns3:SctiesBalAcctgRpt></ns3:Document></BsnsMsg></GalgoAssBalStmt>",
        positions.concat()
    )
}

fn position(desc: &str, unit: Option<&str>, navl: Option<&str>, other_id: Option<&str>) -> String {
    let qty = unit.map_or_else(String::new, |u| {
        format!("<ns3:AggtBal><ns3:Qty><ns3:Qty><ns3:Unit>{u}</ns3:Unit></ns3:Qty></ns3:Qty></ns3:AggtBal>")
    });
    let price = navl.map_or_else(String::new, |p| {
        format!(
            "<ns3:PricDtls><ns3:Tp><ns3:Cd>NAVL</ns3:Cd></ns3:Tp>\
             <ns3:Val><ns3:Amt Ccy=\"BRL\">{p}</ns3:Amt></ns3:Val></ns3:PricDtls>"
        )
    });
    let other = other_id.map_or_else(String::new, |id| {
        format!("<ns3:OthrId><ns3:Id>{id}</ns3:Id></ns3:OthrId>")
    });
    format!(
        "<ns3:BalForAcct><ns3:FinInstrmId><ns3:Desc>{desc}</ns3:Desc>{other}</ns3:FinInstrmId>\
         {qty}{price}</ns3:BalForAcct>"
    )
}

fn tree(xml: &str) -> Node {
    StatementTree::parse(&RawStatement::from_str(xml))
        .expect("valid xml")
        .root()
        .clone()
}

fn dec(value: &str) -> Money {
    value.parse().unwrap()
}

#[test]
fn one_record_per_position_in_order() {
    let positions: Vec<_> = (0..7)
        .map(|i| position(&format!("FUNDO {i}"), Some("1"), Some("1"), None))
        .collect();
    let records = extract(&tree(&statement_xml(&positions, Some("123.45"))));
    assert_eq!(records.len(), 7);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.nome_fundo, format!("FUNDO {i}"));
        assert_eq!(record.patrimonio_liquido, dec("123.45"));
        assert_eq!(record.identificador_arquivo, "S1");
        assert_eq!(record.data_arquivo, "2024-01-31");
    }
}

#[test]
fn statement_without_positions_gives_no_rows() {
    let doc = tree(&statement_xml(&[], Some("10")));
    assert_eq!(try_extract(&doc).expect("report present"), Vec::new());
}

#[test]
fn quantity_times_nav_when_holding_value_missing() {
    let xml = statement_xml(&[position("F", Some("100"), Some("10.5"), None)], None);
    let records = extract(&tree(&xml));
    assert_eq!(records[0].valor_total_ativos, dec("1050.0"));
    assert_eq!(records[0].quantidade_cotas, dec("100"));
    assert_eq!(records[0].patrimonio_liquido, Money::ZERO);
}

#[test]
fn cash_without_prices_has_unit_quantity_and_zero_total() {
    let xml = statement_xml(&[position("CAIXA", None, None, Some("CASH"))], None);
    let records = extract(&tree(&xml));
    assert_eq!(records[0].quantidade_cotas, Money::ONE);
    assert_eq!(records[0].valor_total_ativos, Money::ZERO);
}

#[test]
fn cash_override_ignores_reported_quantity() {
    let xml = statement_xml(
        &[position("CAIXA", Some("2500"), Some("2"), Some("CASH"))],
        None,
    );
    let records = extract(&tree(&xml));
    assert_eq!(records[0].quantidade_cotas, Money::ONE);
    assert_eq!(records[0].valor_total_ativos, dec("5000"));
}

#[test]
fn missing_navl_gives_zero_unit_price() {
    let xml = statement_xml(&[position("F", Some("10"), None, None)], None);
    let records = extract(&tree(&xml));
    assert_eq!(records[0].valor_cota, Money::ZERO);
    assert_eq!(records[0].valor_total_ativos, Money::ZERO);
}

#[test]
fn missing_top_level_path_is_soft_failure() {
    let cases = [
        ("<Other/>", "GalgoAssBalStmt"),
        ("<GalgoAssBalStmt><Hdr/></GalgoAssBalStmt>", "BsnsMsg"),
        (
            "<GalgoAssBalStmt><BsnsMsg><ns3:AppHdr/></BsnsMsg></GalgoAssBalStmt>",
            "Document",
        ),
        (
            "<GalgoAssBalStmt><BsnsMsg><ns3:Document/></BsnsMsg></GalgoAssBalStmt>",
            "ns3:SctiesBalAcctgRpt",
        ),
    ];
    for (xml, missing) in cases {
        let doc = tree(xml);
        assert!(extract(&doc).is_empty(), "{xml}");
        match try_extract(&doc) {
            Err(StatementError::StructureNotFound { element }) => assert_eq!(element, missing),
            other => panic!("unexpected result for {xml}: {other:?}"),
        }
    }
}

#[test]
fn non_mapping_documents_are_soft_failures() {
    assert!(extract(&Node::text_node("plain")).is_empty());
    assert!(extract(&Node::List(Vec::new())).is_empty());
    assert!(extract(&Node::Map(BTreeMap::new())).is_empty());
}

#[test]
fn unwrapped_business_message_is_soft_failure() {
    let report = Node::Map(BTreeMap::new());
    let document = Node::Map(BTreeMap::from([(
        "ns3:SctiesBalAcctgRpt".to_string(),
        Node::List(vec![report]),
    )]));
    let message = Node::Map(BTreeMap::from([(
        "ns3:Document".to_string(),
        Node::List(vec![document]),
    )]));
    // BsnsMsg лежит отображением, а не списком из одного элемента.
    let root = Node::Map(BTreeMap::from([(
        "GalgoAssBalStmt".to_string(),
        Node::Map(BTreeMap::from([("BsnsMsg".to_string(), message)])),
    )]));

    assert!(extract(&root).is_empty());
    assert!(matches!(
        try_extract(&root),
        Err(StatementError::StructureNotFound { element }) if element == "BsnsMsg"
    ));
}

#[test]
fn unprefixed_document_is_supported() {
    let xml = "<GalgoAssBalStmt><BsnsMsg><Document><SctiesBalAcctgRpt>\
               <BalForAcct><FinInstrmId><ISIN>BR0000000001</ISIN></FinInstrmId></BalForAcct>\
               </SctiesBalAcctgRpt></Document></BsnsMsg></GalgoAssBalStmt>";
    let records = extract(&tree(xml));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].isin, "BR0000000001");
    assert_eq!(records[0].identificador_arquivo, "");
}

#[test]
fn position_without_instrument_defaults_identity_fields() {
    let xml = statement_xml(&["<ns3:BalForAcct/>".to_string()], None);
    let records = extract(&tree(&xml));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].nome_fundo, "");
    assert_eq!(records[0].cnpj, "");
    assert_eq!(records[0].quantidade_cotas, Money::ZERO);
}
