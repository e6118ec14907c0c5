//! Behavioral checks for the user form:
//! - validation outcome for well-formed and single-violation records
//! - append/remove list semantics on the state container
//! - the documented example scenarios

use forms::{FieldPath, FormState, Item, Schema, SubmitStatus, UserRecord};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn record(name: &str, lastname: &str, age: &str, titles: &[&str]) -> UserRecord {
    UserRecord {
        name: name.into(),
        lastname: lastname.into(),
        age: age.into(),
        items: titles.iter().map(|t| Item::new(*t)).collect(),
    }
}

fn well_formed() -> impl Strategy<Value = UserRecord> {
    (
        ".{1,12}",
        ".{1,12}",
        ".{10,20}",
        prop::collection::vec(".{3,10}", 0..5),
    )
        .prop_map(|(name, lastname, age, titles)| UserRecord {
            name,
            lastname,
            age,
            items: titles.into_iter().map(Item::new).collect(),
        })
}

proptest! {
    #[test]
    fn well_formed_records_validate_unchanged(r in well_formed()) {
        prop_assert_eq!(Schema::user_record().validate(&r), Ok(r.clone()));
    }

    #[test]
    fn single_violation_reports_exactly_that_field(r in well_formed(), which in 0usize..4) {
        let mut broken = r.clone();
        let expected = match which {
            0 => { broken.name.clear(); FieldPath::key("name") }
            1 => { broken.lastname.clear(); FieldPath::key("lastname") }
            2 => { broken.age = "123".into(); FieldPath::key("age") }
            _ => {
                broken.items.push(Item::new("ab"));
                FieldPath::item("items", broken.items.len() - 1, "title")
            }
        };
        let errors = Schema::user_record().validate(&broken).unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        prop_assert!(errors.contains(&expected));
    }

    #[test]
    fn append_then_remove_restores_items(titles in prop::collection::vec("[a-z]{0,6}", 0..6)) {
        let mut form = FormState::new(Schema::user_record());
        for t in &titles {
            form.append_item(Item::new(t.as_str()));
        }
        let before = form.items().to_vec();
        let index = form.append_item(Item::new("temp"));
        form.remove_item(index).unwrap();
        prop_assert_eq!(form.items(), before.as_slice());
    }

    #[test]
    fn remove_preserves_order_of_the_rest(
        titles in prop::collection::vec("[a-z]{1,6}", 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut form = FormState::new(Schema::user_record());
        for t in &titles {
            form.append_item(Item::new(t.as_str()));
        }
        let index = pick.index(titles.len());
        form.remove_item(index).unwrap();

        let mut expected: Vec<Item> = titles.iter().map(|t| Item::new(t.as_str())).collect();
        expected.remove(index);
        prop_assert_eq!(form.items().len(), titles.len() - 1);
        prop_assert_eq!(form.items(), expected.as_slice());
    }
}

#[test]
fn empty_name_reports_only_name() {
    let errors = Schema::user_record()
        .validate(&record("", "B", "1234567890", &[]))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(&FieldPath::key("name")), Some("Wrong name"));
}

#[test]
fn short_age_with_valid_item_reports_only_age() {
    let errors = Schema::user_record()
        .validate(&record("A", "B", "123", &["okay"]))
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains(&FieldPath::key("age")));
}

#[test]
fn two_appends_then_remove_first_keeps_second() {
    let mut form = FormState::new(Schema::user_record());
    form.append_item(Item::new("first"));
    form.append_item(Item::new("second"));
    form.remove_item(0).unwrap();
    assert_eq!(form.items(), &[Item::new("second")]);
}

#[test]
fn invalid_submit_does_not_invoke_callback_and_keeps_form_open() {
    let mut form = FormState::new(Schema::user_record());
    form.set_value(&FieldPath::key("name"), "A").unwrap();
    form.append_item(Item::default());

    let mut called = false;
    let status = form.submit(|_| called = true);

    assert!(!called);
    assert_eq!(status, SubmitStatus::Invalid);
    assert_eq!(form.submit_status(), SubmitStatus::Invalid);
    assert_eq!(form.value(&FieldPath::key("name")), Some("A"));
    let paths: Vec<String> = form.errors().paths().map(ToString::to_string).collect();
    assert_eq!(paths, ["age", "items[0].title", "lastname"]);

    // Fix everything and resubmit.
    form.set_value(&FieldPath::key("lastname"), "B").unwrap();
    form.set_value(&FieldPath::key("age"), "1234567890").unwrap();
    form.set_value(&FieldPath::item("items", 0, "title"), "okay").unwrap();
    assert!(form.errors().is_empty());

    let mut submitted = None;
    assert_eq!(form.submit(|r| submitted = Some(r.clone())), SubmitStatus::Valid);
    assert_eq!(submitted, Some(record("A", "B", "1234567890", &["okay"])));
}
