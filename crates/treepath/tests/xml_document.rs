use rstest::rstest;
use treepath::model::xml::ParseOptionsBuilder;
use treepath::{Context, Document, Error, NodeKind, ParseOptions, TreeNode, XmlNode};

fn children(node: &XmlNode) -> Vec<XmlNode> {
    std::iter::successors(node.first_child(), TreeNode::next_sibling).collect()
}

#[rstest]
fn builds_elements_text_and_attributes() {
    let doc = Document::parse(r#"<?xml version="1.0"?><a x="1"><b>hi &amp; bye</b><c y="&lt;2"/></a>"#).unwrap();
    let root = doc.root();
    assert!(root.is_root());
    assert_eq!(root.name(), "a");
    assert_eq!(root.attribute("x"), Some("1"));

    let kids = children(&root);
    assert_eq!(kids.len(), 2);
    assert_eq!(kids[0].text(), "hi & bye");
    assert_eq!(kids[1].attribute("y"), Some("<2"));
    assert_eq!(kids[1].parent(), Some(root.clone()));
    assert!(!kids[1].has_next_sibling());
    assert_eq!(doc.node_count(), 4);
}

#[rstest]
fn namespace_attributes_become_declarations() {
    let doc = Document::parse(r#"<a xmlns="urn:d" xmlns:p="urn:p" id="1"/>"#).unwrap();
    let root = doc.root();
    let decls: Vec<_> = root.namespace_declarations().collect();
    assert_eq!(decls, [("", "urn:d"), ("p", "urn:p")]);
    assert_eq!(root.attributes().collect::<Vec<_>>(), [("id", "1")]);

    let options = ParseOptions::builder().with_namespace_attributes(true).build();
    let doc = Document::parse_with(r#"<a xmlns:p="urn:p" id="1"/>"#, &options).unwrap();
    assert_eq!(doc.root().attributes().count(), 2);
    assert_eq!(doc.root().namespace_declarations().count(), 1);
}

#[rstest]
fn whitespace_and_comments_follow_options() {
    let xml = "<a>\n  <!-- note -->\n  <b/>\n</a>";
    let plain = Document::parse(xml).unwrap();
    assert_eq!(children(&plain.root()).len(), 1);

    let options = ParseOptionsBuilder::new().with_whitespace_text(true).with_comments(true).build();
    let full = Document::parse_with(xml, &options).unwrap();
    let kinds: Vec<_> = children(&full.root()).iter().map(TreeNode::kind).collect();
    assert_eq!(
        kinds,
        [NodeKind::Text, NodeKind::Comment, NodeKind::Text, NodeKind::Element, NodeKind::Text]
    );
    assert_eq!(children(&full.root())[1].value(), " note ");
}

#[rstest]
fn cdata_joins_surrounding_text() {
    let doc = Document::parse("<a>x<![CDATA[<y>]]>z</a>").unwrap();
    assert_eq!(doc.root().text(), "x<y>z");
}

#[rstest]
fn serializes_subtrees() {
    let xml = r#"<a xmlns:p="urn:p"><p:b k="v &amp; w">t</p:b><c/></a>"#;
    let doc: Document = xml.parse().unwrap();
    assert_eq!(doc.root().serialize(), xml);
    let b = doc.root().first_child().unwrap();
    assert_eq!(Context::from(b).serialize(), r#"<p:b k="v &amp; w">t</p:b>"#);
}

#[rstest]
fn handles_compare_by_identity() {
    let xml = "<a><b/></a>";
    let one = Document::parse(xml).unwrap();
    let two = Document::parse(xml).unwrap();
    assert_eq!(one.root(), one.clone().root());
    assert_ne!(one.root(), two.root());
    assert_eq!(one.root().first_child().unwrap().index(), 1);
}

#[rstest]
#[case::empty("")]
#[case::only_declaration("<?xml version=\"1.0\"?>")]
#[case::only_comment("<!-- nothing -->")]
fn missing_root_is_an_error(#[case] xml: &str) {
    assert!(matches!(Document::parse(xml), Err(Error::NoRootElement)));
}

#[rstest]
fn second_root_is_an_error() {
    let err = Document::parse("<a/><b/>").unwrap_err();
    assert!(matches!(err, Error::TrailingElement(ref name) if name == "b"), "{err}");
}

#[rstest]
#[case::mismatched("<a><b></a>")]
#[case::unclosed("<a><b/>")]
#[case::stray_end("<a/></b>")]
fn unbalanced_markup_is_an_error(#[case] xml: &str) {
    let err = Document::parse(xml).unwrap_err();
    assert!(matches!(err, Error::UnbalancedTag { .. } | Error::Xml(_)), "{err}");
}
