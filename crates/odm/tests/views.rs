//! Query and hydration against the in-memory store's indexed views.

use serde_json::{json, Map, Value};

use ottoman_odm::{define, Definition, DocumentStore, MemoryStore, OdmError, ViewError};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

#[tokio::test]
async fn get_model_finds_exactly_one_document() {
    let monster = define("ViewsMonster", Definition::new().view("by_location")).unwrap();
    let store = MemoryStore::new();
    store.index_view("ViewsMonster", "by_location", "location");

    let mut marvin = monster
        .create_with_id("marvin", object(json!({"location": "couch"})))
        .unwrap();
    marvin.save(&store).await.unwrap();
    let mut gregor = monster
        .create_with_id("gregor", object(json!({"location": "attic"})))
        .unwrap();
    gregor.save(&store).await.unwrap();

    let found = monster
        .get_model("couch")
        .invoke(&store, "by_location")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), Some("marvin"));
    assert_eq!(found.type_name(), "ViewsMonster");
    assert!(!found.has("type"));
    assert_eq!(found.rev(), marvin.rev());

    let nobody = monster
        .get_model("basement")
        .invoke(&store, "by_location")
        .await
        .unwrap();
    assert!(nobody.is_none());
}

#[tokio::test]
async fn get_model_rejects_ambiguous_keys() {
    let monster = define("ViewsAmbiguous", Definition::new().view("by_location")).unwrap();
    let store = MemoryStore::new();
    store.index_view("ViewsAmbiguous", "by_location", "location");

    for id in ["marvin", "gregor"] {
        let mut model = monster
            .create_with_id(id, object(json!({"location": "couch"})))
            .unwrap();
        model.save(&store).await.unwrap();
    }

    let error = monster
        .get_model("couch")
        .invoke(&store, "by_location")
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Multiple documents found");
}

#[tokio::test]
async fn get_collection_hydrates_mixed_types_in_view_order() {
    // two types whose documents share the indexed field; the view scans
    // every document, so hydration dispatches per row
    let monster = define("ViewsHerdMonster", Definition::new().view("by_location")).unwrap();
    let ghost = define("ViewsHerdGhost", Definition::new()).unwrap();
    let store = MemoryStore::new();
    store.index_view("ViewsHerdMonster", "by_location", "location");

    let mut marvin = monster
        .create_with_id("marvin", object(json!({"location": "couch"})))
        .unwrap();
    marvin.save(&store).await.unwrap();
    let mut casper = ghost
        .create_with_id("casper", object(json!({"location": "attic"})))
        .unwrap();
    casper.save(&store).await.unwrap();

    let everyone = monster
        .get_collection()
        .invoke(&store, "by_location")
        .await
        .unwrap();

    assert_eq!(everyone.len(), 2);
    // ordered by key: attic before couch
    assert_eq!(everyone.get(0).unwrap().type_name(), "ViewsHerdGhost");
    assert_eq!(everyone.get(1).unwrap().type_name(), "ViewsHerdMonster");
    for model in &everyone {
        assert!(!model.has("type"));
    }
}

#[tokio::test]
async fn get_collection_on_an_empty_view_is_an_empty_collection() {
    let monster = define("ViewsEmpty", Definition::new().view("by_location")).unwrap();
    let store = MemoryStore::new();
    store.index_view("ViewsEmpty", "by_location", "location");

    let nobody = monster
        .get_collection()
        .invoke(&store, "by_location")
        .await
        .unwrap();
    assert!(nobody.is_empty());
}

#[tokio::test]
async fn unregistered_discriminators_poison_the_whole_batch() {
    let monster = define("ViewsPoisoned", Definition::new().view("by_location")).unwrap();
    let store = MemoryStore::new();
    store.index_view("ViewsPoisoned", "by_location", "location");

    let mut marvin = monster
        .create_with_id("marvin", object(json!({"location": "couch"})))
        .unwrap();
    marvin.save(&store).await.unwrap();

    // a document written outside the mapping layer with a type nobody
    // registered
    store
        .insert(
            object(json!({"location": "couch", "type": "NeverDefined"})),
            Some("intruder"),
        )
        .await
        .unwrap();

    let error = monster
        .get_collection()
        .invoke(&store, "by_location")
        .await
        .unwrap_err();
    match error {
        OdmError::View(ViewError::UnknownType {
            type_name,
            document,
        }) => {
            assert_eq!(type_name, "NeverDefined");
            assert_eq!(document.get("_id"), Some(&json!("intruder")));
        }
        other => panic!("expected UnknownType, got {:?}", other),
    }
}

#[tokio::test]
async fn hydration_runs_defaults_and_initialize_hooks() {
    let monster = define(
        "ViewsHydrated",
        Definition::new()
            .default_value("scary", true)
            .view("by_location")
            .initialize(|model| {
                model.set("hydrated", true).unwrap();
            }),
    )
    .unwrap();
    let store = MemoryStore::new();
    store.index_view("ViewsHydrated", "by_location", "location");

    let mut marvin = monster
        .create_with_id("marvin", object(json!({"location": "couch", "scary": false})))
        .unwrap();
    marvin.save(&store).await.unwrap();

    let found = monster
        .get_model("couch")
        .invoke(&store, "by_location")
        .await
        .unwrap()
        .unwrap();
    // stored value wins over the default, and the hook ran on hydration
    assert_eq!(found.get("scary"), Some(&json!(false)));
    assert_eq!(found.get("hydrated"), Some(&json!(true)));
}
