//! Owner types with composite primary keys, unique composites and composite
//! foreign keys, exercised through the public surface only.

use std::sync::Arc;
use tessera::{
    core::{
        error::{CompositeError, ModelError},
        model::{IndexModel, UniqueGroup},
    },
    prelude::*,
};

///
/// Person
/// composite primary key over first and last name
///

fn person() -> OwnerType {
    let mut b = OwnerTypeBuilder::new("scenarios::Person").expect("builder");
    let first = b.field(ScalarField::text("first_name")).expect("first_name");
    let last = b.field(ScalarField::text("last_name")).expect("last_name");
    b.field(ScalarField::text("birthplace").nullable())
        .expect("birthplace");
    b.attach_composite(
        "full_name",
        CompositeDeclaration::new([first, last])
            .expect("decl")
            .primary_key(),
    )
    .expect("full_name");

    b.finalize().expect("finalize person")
}

///
/// Song
/// composite foreign key onto Person plus a unique (title, author) composite
///

fn song() -> OwnerType {
    let mut b = OwnerTypeBuilder::new("scenarios::Song").expect("builder");
    b.field(ScalarField::uint("id").primary_key()).expect("id");
    let title = b.field(ScalarField::text("title")).expect("title");
    let author_first = ScalarField::text("author_first_name").into_ref();
    let author_last = ScalarField::text("author_last_name").into_ref();

    b.attach_composite(
        "author",
        CompositeDeclaration::new([Arc::clone(&author_first), Arc::clone(&author_last)])
            .expect("decl"),
    )
    .expect("author");
    b.attach_composite(
        "signature",
        CompositeDeclaration::new([title, Arc::clone(&author_first), Arc::clone(&author_last)])
            .expect("decl")
            .unique(),
    )
    .expect("signature");
    b.attach_field(author_first).expect("author_first_name");
    b.attach_field(author_last).expect("author_last_name");

    b.finalize().expect("finalize song")
}

#[test]
fn composite_primary_key_replaces_implicit_id() {
    let person = person();

    assert_eq!(person.primary_key().name(), "full_name");
    assert!(person.attribute("id").is_none());
    assert_eq!(
        person.index_models(),
        vec![IndexModel {
            owner: "scenarios::Person",
            columns: vec!["first_name".into(), "last_name".into()],
            unique: true,
            primary: true,
        }]
    );
}

#[test]
fn pk_value_is_the_composite_value() {
    let person = person();
    let mut john = person.new_row();
    person
        .write("first_name", &mut john, Value::from("John"))
        .expect("first");
    person
        .write("last_name", &mut john, Value::from("Lennon"))
        .expect("last");

    let pk = person.pk_value(&john).expect("pk");

    assert_eq!(pk, Value::tuple(["John", "Lennon"]));
    assert_eq!(person.read("full_name", &john).expect("read"), pk);
}

#[test]
fn setting_pk_writes_enclosed_fields() {
    let person = person();
    let mut row = person.new_row();

    person
        .set_pk(&mut row, Value::tuple(["George", "Harrison"]))
        .expect("set pk");

    assert_eq!(row.value("first_name"), Some(Value::from("George")));
    assert_eq!(row.value("last_name"), Some(Value::from("Harrison")));
    assert_eq!(row.value("birthplace"), None);
}

#[test]
fn foreign_composite_is_assigned_from_other_pk() {
    let person = person();
    let song = song();
    let mut paul = person.new_row();
    person
        .set_pk(&mut paul, Value::tuple(["Paul", "McCartney"]))
        .expect("person pk");

    let mut yesterday = song.new_row();
    song.write("id", &mut yesterday, Value::Uint(1)).expect("id");
    song.write("title", &mut yesterday, Value::from("Yesterday"))
        .expect("title");
    song.write("author", &mut yesterday, person.pk_value(&paul).expect("pk"))
        .expect("author");

    assert_eq!(
        yesterday.value("author_last_name"),
        Some(Value::from("McCartney"))
    );
    assert_eq!(
        song.read("signature", &yesterday).expect("signature"),
        Value::tuple(["Yesterday", "Paul", "McCartney"])
    );
}

#[test]
fn unique_composite_adds_one_group_and_index() {
    let song = song();

    assert_eq!(
        song.unique_groups(),
        [UniqueGroup {
            fields: vec![
                "title".into(),
                "author_first_name".into(),
                "author_last_name".into()
            ],
        }]
    );

    let indexes = song.index_models();
    assert_eq!(indexes.len(), 2);
    assert_eq!(
        indexes[1].to_string(),
        "UNIQUE scenarios::Song(title, author_first_name, author_last_name)"
    );
}

#[test]
fn finalize_twice_reuses_the_shape() {
    let first = person();
    let second = person();

    let a = first.composite("full_name").expect("composite").shape();
    let b = second.composite("full_name").expect("composite").shape();

    assert!(Arc::ptr_eq(a, b));
}

#[test]
fn pk_lookups_go_through_the_composite() {
    let person = person();

    let prepared = person
        .prepare_lookup(
            "pk",
            LookupKind::In,
            &Value::List(vec![
                Value::tuple(["John", "Lennon"]),
                Value::tuple(["Ringo", "Starr"]),
            ]),
        )
        .expect("pk in");

    assert_eq!(prepared.param_count(), 4);

    let err = person
        .prepare_lookup("full_name", LookupKind::StartsWith, &Value::from("J"))
        .unwrap_err();
    assert!(matches!(
        err,
        tessera::Error::Composite(CompositeError::UnsupportedLookup { .. })
    ));
}

#[test]
fn atomic_lookups_still_work_next_to_composites() {
    let person = person();

    let prepared = person
        .prepare_lookup("first_name", LookupKind::StartsWith, &Value::from("J"))
        .expect("startswith");

    assert_eq!(prepared, PreparedLookup::Compare(vec![Value::from("J")]));
}

#[test]
fn ordering_by_composite_expands_to_columns() {
    let song = song();

    assert_eq!(
        song.order_columns("author").expect("order"),
        ["author_first_name", "author_last_name"]
    );
}

#[test]
fn closed_row_rejects_composite_write_with_foreign_slot() {
    let person = person();
    let mut row = Row::with_slots(["first_name"]);

    let err = person
        .set_pk(&mut row, Value::tuple(["John", "Lennon"]))
        .unwrap_err();

    assert_eq!(err.to_string(), "record has no slot named 'last_name'");
}

#[test]
fn enclosing_another_owners_field_fails() {
    let mut band = OwnerTypeBuilder::new("scenarios::Band").expect("builder");
    let name = band
        .field(ScalarField::text("name").primary_key())
        .expect("name");

    let mut tour = OwnerTypeBuilder::new("scenarios::Tour").expect("builder");
    tour.field(ScalarField::uint("id").primary_key()).expect("id");
    tour.attach_composite("headliner", CompositeDeclaration::new([name]).expect("decl"))
        .expect("headliner");

    let err = tour.finalize().unwrap_err();

    assert!(matches!(
        err,
        ModelError::ForeignField {
            other: "scenarios::Band",
            ..
        }
    ));
}
