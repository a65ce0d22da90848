use treepath::expr::{attribute_eq, child, descendant_named, where_};
use treepath::{Document, Selection, compile, concatenate};

fn main() -> treepath::Result<()> {
    let doc = Document::parse(
        r#"<library xmlns="urn:books" xmlns:m="urn:meta">
            <shelf name="fiction">
                <book id="1"><title>Dune</title><m:tag>sf</m:tag></book>
                <book id="2"><title>Emma</title></book>
            </shelf>
            <shelf name="reference">
                <book id="3"><title>Atlas</title><m:tag>maps</m:tag></book>
            </shelf>
        </library>"#,
    )?;

    let tagged = Selection::from_node(doc.root(), child() / where_(descendant_named("tag")));
    println!("shelves with tagged books: {}", concatenate(tagged.attribute_values("name"), ", "));

    let titles = Selection::from_node(doc.root(), compile("descendant::book[child::tag]/child::title")?);
    println!("compiled: {}", titles.expr());
    println!("titles: {}", concatenate(titles.texts(), ", "));

    let second = Selection::from_node(doc.root(), descendant_named("book") / attribute_eq("id", "2"));
    println!("book 2: {}", second.xml_string());
    for ctx in &Selection::from_node(doc.root(), descendant_named("tag")) {
        println!("{} -> {}", ctx.name(), ctx.namespace_uri());
    }
    Ok(())
}
