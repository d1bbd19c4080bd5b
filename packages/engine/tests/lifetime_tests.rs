//! Weak binding between objects and their document

use xdynamic_engine::{CacheStats, Document, EngineError, Value, XmlObject};

#[test]
fn test_nested_object_fails_after_document_dropped() {
    let root = XmlObject::parse("<Root><Child><Id>1</Id></Child></Root>").unwrap();
    let child = root.get("Child").unwrap().into_object().unwrap();
    assert!(child.is_alive());

    drop(root);

    assert!(!child.is_alive());
    assert!(matches!(
        child.get("Id"),
        Err(EngineError::AnchorReleased(_))
    ));
    assert!(matches!(
        child.set("Id", 2i32),
        Err(EngineError::AnchorReleased(_))
    ));
}

#[test]
fn test_object_over_borrowed_document_does_not_keep_it_alive() {
    let doc = Document::parse("<Root><Id>1</Id></Root>").unwrap();
    let root = XmlObject::from_document(&doc);
    assert_eq!(root.get("Id").unwrap().as_str(), Some("1"));

    drop(doc);
    assert!(matches!(root.get("Id"), Err(EngineError::AnchorReleased(_))));
}

#[test]
fn test_removed_element_fails_predictably() {
    let root = XmlObject::parse("<Root><Child><Id>1</Id></Child></Root>").unwrap();
    let child = root.get("Child").unwrap().into_object().unwrap();

    root.set("Child", Value::Null).unwrap();

    assert!(!child.is_alive());
    assert!(matches!(child.get("Id"), Err(EngineError::AnchorReleased(_))));
}

#[test]
fn test_dead_cached_object_is_recomputed() {
    let root = XmlObject::parse("<Root><Child><Id>1</Id></Child></Root>").unwrap();
    let first = root.get("Child").unwrap().into_object().unwrap();

    let doc = root.document().unwrap();
    doc.remove(first.node()).unwrap();
    let replacement = doc.create_element("Child").unwrap();
    doc.append_child(doc.root(), replacement).unwrap();
    let id = doc.create_element("Id").unwrap();
    doc.set_text(id, "2").unwrap();
    doc.append_child(replacement, id).unwrap();

    let second = root.get("Child").unwrap().into_object().unwrap();
    assert_ne!(first, second);
    assert_eq!(second.get("Id").unwrap().as_str(), Some("2"));
}

#[test]
fn test_released_child_is_projected_again() {
    let root = XmlObject::parse("<Root><Child><Id>1</Id></Child></Root>").unwrap();
    let child = root.get("Child").unwrap().into_object().unwrap();
    assert_eq!(child.get("Id").unwrap().as_str(), Some("1"));
    assert_eq!(child.cache_stats(), CacheStats { hits: 0, misses: 1 });

    let kept = root.get("Child").unwrap().into_object().unwrap();
    assert_eq!(kept.cache_stats(), CacheStats { hits: 0, misses: 1 });
    drop(kept);
    drop(child);

    let fresh = root.get("Child").unwrap().into_object().unwrap();
    assert_eq!(fresh.cache_stats(), CacheStats { hits: 0, misses: 0 });
    assert_eq!(fresh.get("Id").unwrap().as_str(), Some("1"));
    assert_eq!(root.cache_stats(), CacheStats { hits: 1, misses: 2 });
}

#[test]
fn test_nested_write_is_visible_from_parent() {
    let root = XmlObject::parse("<Root><Child><Id>1</Id></Child></Root>").unwrap();
    let child = root.get("Child").unwrap().into_object().unwrap();

    child.set("Id", 2i32).unwrap();

    let again = root.get("Child").unwrap().into_object().unwrap();
    assert_eq!(again.get("Id").unwrap().as_i64(), Some(2));
    assert_eq!(
        root.to_xml().unwrap(),
        r#"<Root><Child><Id _dataType="System.Int32">2</Id></Child></Root>"#
    );
}

#[test]
fn test_from_node_binds_inner_element() {
    let doc = Document::parse("<Root><A><B>x</B></A></Root>").unwrap();
    let a = doc.children_named(doc.root(), "A").unwrap()[0];
    let object = XmlObject::from_node(&doc, a).unwrap();
    assert_eq!(object.get("B").unwrap().as_str(), Some("x"));
}
