use std::cell::{Cell, RefCell};
use std::rc::Rc;

use graph_overrides::captions::Captions;
use graph_overrides::catalog::{Catalog, CatalogOption, CatalogSection};
use graph_overrides::form::{ControlMarkup, Field, FieldKind, FieldSelector, Pill, Row};
use graph_overrides::naming::Naming;
use graph_overrides::store::{ControlConfig, OverrideStore};

fn counted_config() -> (ControlConfig, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let config = ControlConfig::default()
        .with_menu(Catalog::new(vec![CatalogSection::new(
            "Data",
            vec![CatalogOption::new("Time shift", &["timeshift", ""])],
        )]))
        .with_on_change(move |_| seen.set(seen.get() + 1));
    (config, calls)
}

#[test]
fn timeshift_add_then_remove() {
    let (config, calls) = counted_config();
    let mut store = OverrideStore::from_markup(config, ControlMarkup::default());
    assert!(store.is_empty());

    store.add("timeshift", Some("1h".into()));
    assert_eq!(store.len(), 1);
    assert_eq!(store.field_value("timeshift"), Some("1h"));
    assert_eq!(calls.get(), 1);

    store.remove("timeshift");
    assert!(store.is_empty());
    assert!(store.fields().is_empty());
    assert_eq!(store.field_value("timeshift"), None);
    assert_eq!(calls.get(), 2);
}

#[test]
fn add_on_existing_key_replaces_value() {
    let (config, calls) = counted_config();
    let mut store = OverrideStore::from_markup(config, ControlMarkup::default());

    store.add("width", Some("1".into()));
    store.add("width", Some("4".into()));

    assert_eq!(store.len(), 1);
    assert_eq!(store.entry("width").unwrap().value.as_deref(), Some("4"));
    assert_eq!(store.fields(), vec![Field::hidden("width", Some("4".into()))]);
    assert_eq!(calls.get(), 2);
}

#[test]
fn update_never_creates_entries_or_fires_change() {
    let (config, calls) = counted_config();
    let mut store = OverrideStore::from_markup(config, ControlMarkup::default());

    store.update("width", Some("2".into()));
    assert_eq!(store.len(), 0);

    store.add("width", Some("1".into()));
    store.update("width", Some("2".into()));
    assert_eq!(store.len(), 1);
    assert_eq!(store.field_value("width"), Some("2"));
    assert_eq!(calls.get(), 1);
}

#[test]
fn removing_unset_override_is_silent() {
    let (config, calls) = counted_config();
    let mut store = OverrideStore::from_markup(config, ControlMarkup::default());
    store.remove("width");
    assert_eq!(calls.get(), 0);
}

#[test]
fn labels_use_captions_except_for_reserved_options() {
    let captions = Captions::new()
        .with_label("type", "Draw")
        .with_value("type", "1", "Points")
        .with_value("color", "0", "Red");
    let config = ControlConfig::default().with_captions(captions);
    let mut store = OverrideStore::from_markup(config, ControlMarkup::default());

    store.add("type", Some("1".into()));
    store.add("color", Some("0".into()));
    store.add("fill", Some("3".into()));

    assert_eq!(store.entry("type").unwrap().label, "Draw: Points");
    assert_eq!(store.entry("fill").unwrap().label, "fill: 3");
    match &store.entry("color").unwrap().pill {
        Pill::Editable { field } => {
            assert_eq!(field.kind, FieldKind::Text);
            assert_eq!(field.serialized_value(), "0");
        }
        other => panic!("color should be editable, got {other:?}"),
    }

    store.update("type", Some("9".into()));
    assert_eq!(store.entry("type").unwrap().pill.text(), "Draw: 9");
}

#[test]
fn caption_applies_to_color_outside_reserved_rendering() {
    let captions = Captions::new().with_value("color", "0", "Red");
    assert_eq!(captions.display("color", Some("0")), "color: Red");
}

#[test]
fn new_pills_go_before_the_add_trigger() {
    let markup = ControlMarkup::default().with_trigger("add", Some("0"));
    let config = ControlConfig::default().with_add("add");
    let mut store = OverrideStore::from_markup(config, markup);

    store.add("a", None);
    store.add("b", None);

    let rows = store.rows();
    assert_eq!(rows.len(), 3);
    assert!(matches!(rows[0], Row::Pill { option: "a", .. }));
    assert!(matches!(rows[1], Row::Pill { option: "b", .. }));
    assert_eq!(rows[2], Row::AddTrigger { row: Some("0") });
}

#[test]
fn adoption_reads_existing_fields_through_naming() {
    let markup = ControlMarkup::default()
        .with_field(Field::hidden("ds[3][type]", Some("1".into())))
        .with_field(Field::hidden("ds[3][width]", Some("2".into())))
        .with_field(Field::hidden("other", Some("x".into())))
        .with_trigger("add-3", Some("3"));
    let (config, calls) = counted_config();
    let config = config
        .with_add("add-3")
        .with_naming(Naming::template("ds[{row}][{option}]").unwrap())
        .with_options(FieldSelector::new(None, Some(r"^ds\[")).unwrap());

    let mut store = OverrideStore::from_markup(config, markup);
    assert_eq!(calls.get(), 0);
    let options: Vec<_> = store.entries().iter().map(|e| e.option.as_str()).collect();
    assert_eq!(options, vec!["type", "width"]);
    assert_eq!(store.retained_fields(), &[Field::hidden("other", Some("x".into()))]);

    store.add("timeshift", Some("-1d".into()));
    assert_eq!(store.field_value("ds[3][timeshift]"), Some("-1d"));
    assert_eq!(store.name_for("color"), "ds[3][color]");
}

#[test]
fn custom_naming_functions_are_used() {
    let config = ControlConfig::default()
        .with_name_for(|option| format!("override_{option}"))
        .with_parse_option(|name| name.trim_start_matches("override_").to_string());
    let markup =
        ControlMarkup::default().with_field(Field::hidden("override_width", Some("5".into())));
    let mut store = OverrideStore::from_markup(config, markup);

    assert_eq!(store.entry("width").unwrap().value.as_deref(), Some("5"));
    store.add("fill", Some("1".into()));
    assert_eq!(store.field_value("override_fill"), Some("1"));
}

#[test]
fn empty_option_key_is_ignored() {
    let (config, calls) = counted_config();
    let mut store = OverrideStore::from_markup(config, ControlMarkup::default());
    store.add("", Some("1".into()));
    assert!(store.is_empty());
    assert_eq!(calls.get(), 0);
}

#[test]
fn change_callback_sees_the_updated_fields() {
    let observed: Rc<RefCell<Vec<Vec<Field>>>> = Rc::default();
    let sink = observed.clone();
    let config = ControlConfig::default()
        .with_naming(Naming::template("ds[{row}][{option}]").unwrap())
        .with_on_change(move |store| sink.borrow_mut().push(store.fields()));
    let markup = ControlMarkup::default().with_trigger("add", Some("1"));
    let mut store = OverrideStore::from_markup(config.with_add("add"), markup);

    store.add("width", Some("3".into()));
    store.remove("width");

    let observed = observed.borrow();
    assert_eq!(observed.len(), 2);
    assert_eq!(observed[0], vec![Field::hidden("ds[1][width]", Some("3".into()))]);
    assert!(observed[1].is_empty());
}

#[test]
fn adoption_skips_fields_that_parse_to_an_empty_key() {
    let config = ControlConfig::default()
        .with_parse_option(|name| name.strip_prefix("ov_").unwrap_or("").to_string());
    let markup = ControlMarkup::default()
        .with_field(Field::hidden("stray", Some("1".into())))
        .with_field(Field::hidden("ov_width", Some("2".into())));
    let store = OverrideStore::from_markup(config, markup);

    assert_eq!(store.len(), 1);
    assert!(!store.contains(""));
    assert_eq!(store.entry("width").unwrap().value.as_deref(), Some("2"));
}
