use graph_overrides::catalog::{Catalog, CatalogOption, CatalogSection};
use graph_overrides::controller::{OverrideController, Request};
use graph_overrides::form::ControlMarkup;
use graph_overrides::menu::{build_category_menu, build_full_tree, flatten};

fn draw_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogSection::new(
            "Draw",
            vec![
                CatalogOption::new("Base color", &["color", ""]),
                CatalogOption::new("Draw type.Line", &["type", "0"]),
                CatalogOption::new("Draw type.Points", &["type", "1"]),
                CatalogOption::new("Width.1", &["width", "1"]),
                CatalogOption::new("Width.2", &["width", "2"]),
            ],
        ),
        CatalogSection::new("Empty", vec![]),
        CatalogSection::new(
            "Data",
            vec![CatalogOption::new("Time shift", &["timeshift", ""])],
        ),
    ])
}

#[test]
fn full_tree_nests_dotted_names() {
    let catalog = Catalog::new(vec![CatalogSection::new(
        "General",
        vec![
            CatalogOption::new("color", &["color"]),
            CatalogOption::new("series.width", &["width"]),
            CatalogOption::new("series.style", &["style"]),
        ],
    )]);

    let tree = build_full_tree(&catalog);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].label, "General");

    let labels: Vec<_> = tree[0].nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["color", "series"]);
    assert!(tree[0].nodes[0].is_leaf());

    let series = tree[0].node("series").expect("series node");
    assert!(!series.is_leaf());
    let leaves: Vec<_> = series.children.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(leaves, vec!["width", "style"]);
    assert!(series.children.iter().all(|n| n.is_leaf()));
    assert_eq!(
        series.child("style").and_then(|n| n.payload.as_ref()).map(|p| p.args.clone()),
        Some(vec!["style".to_string()])
    );
}

#[test]
fn sections_without_options_are_omitted() {
    let tree = build_full_tree(&draw_catalog());
    let labels: Vec<_> = tree.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Draw", "Data"]);
}

#[test]
fn nodes_keep_first_insertion_order() {
    let catalog = Catalog::new(vec![CatalogSection::new(
        "S",
        vec![
            CatalogOption::new("z.b", &["z", "b"]),
            CatalogOption::new("a", &["a"]),
            CatalogOption::new("z.a", &["z", "a"]),
        ],
    )]);
    let tree = build_full_tree(&catalog);
    let top: Vec<_> = tree[0].nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(top, vec!["z", "a"]);
    let z: Vec<_> = tree[0].nodes[0]
        .children
        .iter()
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(z, vec!["b", "a"]);
}

#[test]
fn category_menu_offers_only_sibling_values() {
    let section = build_category_menu(&draw_catalog(), "type").expect("type is in the catalog");
    assert_eq!(section.label, "Draw type");
    let labels: Vec<_> = section.nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["Line", "Points"]);
}

#[test]
fn category_menu_for_unknown_option_is_empty() {
    assert!(build_category_menu(&draw_catalog(), "missing").is_none());
}

#[test]
fn each_leaf_handler_carries_its_own_payload() {
    let mut controller = OverrideController::new();
    let id = controller.mount(ControlMarkup::default());
    let items = flatten(id, &build_full_tree(&draw_catalog()));

    let width = items[0]
        .items
        .iter()
        .find(|i| i.label == "Width")
        .expect("width submenu");
    assert!(width.on_click.is_none());

    let handlers: Vec<_> = width
        .items
        .iter()
        .map(|i| i.on_click.clone().expect("leaf has a handler"))
        .collect();
    assert_eq!(handlers.len(), 2);
    assert_eq!(handlers[0].action.args, vec!["width", "1"]);
    assert_eq!(handlers[1].action.args, vec!["width", "2"]);
    assert!(handlers.iter().all(|h| h.control == id));

    match handlers[1].request() {
        Request::Add { option, value } => {
            assert_eq!(option, "width");
            assert_eq!(value.as_deref(), Some("2"));
        }
        other => panic!("unexpected request {other:?}"),
    }
}

#[test]
fn section_items_have_no_payload() {
    let mut controller = OverrideController::new();
    let id = controller.mount(ControlMarkup::default());
    let items = flatten(id, &build_full_tree(&draw_catalog()));
    assert!(items.iter().all(|i| i.data.is_none() && !i.is_selectable()));
    assert_eq!(items[1].items[0].label, "Time shift");
    assert!(items[1].items[0].data.is_some());
}
