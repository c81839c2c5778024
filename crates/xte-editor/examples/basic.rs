//! Example: Basic usage of an XTE editor session

use url::Url;
use xte_dom::{ElementData, NodeId, PathLabel};
use xte_editor::{EditorSession, ModuleRow};
use xte_net::{Endpoints, HttpGateway};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Wire the session to a parser backend
    let base = Url::parse("http://localhost:8000/parser/").unwrap();
    let gateway = HttpGateway::new(Endpoints::rooted(&base).unwrap());
    let mut session = EditorSession::new("1", gateway);

    // Mirror a server-rendered form: address[1]/street[1]
    let address = session
        .tree_mut()
        .add_element(
            NodeId::ROOT,
            ElementData::labeled(PathLabel::parse("ns:address[1]").unwrap()),
        )
        .unwrap();
    let street = session
        .tree_mut()
        .add_element(
            address,
            ElementData::labeled(PathLabel::parse("ns:street[1]").unwrap()),
        )
        .unwrap();

    session
        .modules_mut()
        .push(ModuleRow::new("1", "mod/popup", "popup dialog"));
    session
        .modules_mut()
        .push(ModuleRow::new("2", "mod/keyref", "auto-key generator"));

    println!(
        "street resolves to {}",
        xte_dom::xpath(session.tree(), street).unwrap()
    );

    session.show_module_manager(street).unwrap();
    println!(
        "picker shows {} module(s)",
        session.modules().visible_rows().count()
    );

    // Attaching goes over the wire:
    // smol::block_on(async {
    //     let marker = session.insert_module(0).await.unwrap();
    //     println!("module attached at {:?}", marker);
    // });
}
