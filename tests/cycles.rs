use mimeo::construct::{Key, Value};
use mimeo::walker::{clone_iterative, clone_recursive};

fn both(value: &Value) -> Vec<Value> {
    vec![
        clone_recursive(value).expect("recursive clone ok"),
        clone_iterative(value).expect("iterative clone ok"),
    ]
}

fn field(record: &Value, name: &str) -> Value {
    record
        .as_record()
        .unwrap()
        .borrow()
        .get(&Key::text(name))
        .expect("field present")
}

#[test]
fn self_reference_resolves_to_the_clone() {
    let original = Value::record();
    {
        let cell = original.as_record().unwrap();
        cell.borrow_mut().set(Key::text("name"), Value::text("Alice"));
        cell.borrow_mut().set(Key::text("self"), original.clone());
    }
    for clone in both(&original) {
        assert!(!clone.is_identical(&original));
        let inner = field(&clone, "self");
        assert!(inner.is_identical(&clone), "the cycle must close on the clone itself");
        assert!(field(&clone, "name").is_identical(&Value::text("Alice")));
    }
}

#[test]
fn three_node_cycle_survives() {
    let a = Value::record();
    let b = Value::record();
    let c = Value::record();
    a.as_record().unwrap().borrow_mut().set(Key::text("a"), Value::number(1.0));
    b.as_record().unwrap().borrow_mut().set(Key::text("b"), Value::number(2.0));
    c.as_record().unwrap().borrow_mut().set(Key::text("c"), Value::number(3.0));
    a.as_record().unwrap().borrow_mut().set(Key::text("next"), b.clone());
    b.as_record().unwrap().borrow_mut().set(Key::text("next"), c.clone());
    c.as_record().unwrap().borrow_mut().set(Key::text("next"), a.clone());
    for clone in both(&a) {
        let round_trip = field(&field(&field(&clone, "next"), "next"), "next");
        assert!(round_trip.is_identical(&clone), "three hops must land back on the clone");
        assert!(!round_trip.is_identical(&a));
    }
}

#[test]
fn self_reference_and_longer_cycle_together() {
    let a = Value::record();
    let b = Value::record();
    a.as_record().unwrap().borrow_mut().set(Key::text("ref"), b.clone());
    b.as_record().unwrap().borrow_mut().set(Key::text("back"), a.clone());
    a.as_record().unwrap().borrow_mut().set(Key::text("self"), a.clone());
    for clone in both(&a) {
        assert!(field(&clone, "self").is_identical(&clone));
        assert!(field(&field(&clone, "ref"), "back").is_identical(&clone));
    }
}

// arr = [1,2]; arr.push(arr) -> out[2] is out itself
#[test]
fn sequences_may_contain_themselves() {
    let original = Value::sequence_of(vec![Value::number(1.0), Value::number(2.0)]);
    original
        .as_sequence()
        .unwrap()
        .borrow_mut()
        .push(original.clone());
    for clone in both(&original) {
        let cell = clone.as_sequence().unwrap().borrow();
        assert_eq!(cell.len(), 3);
        assert!(cell.get(2).unwrap().is_identical(&clone));
        assert!(!cell.get(2).unwrap().is_identical(&original));
    }
}

#[test]
fn sequence_cycle_through_a_record() {
    let original = Value::sequence_of(vec![
        Value::number(1.0),
        Value::number(2.0),
        Value::number(3.0),
    ]);
    original
        .as_sequence()
        .unwrap()
        .borrow_mut()
        .push(original.clone());
    let wrapper = Value::record();
    wrapper
        .as_record()
        .unwrap()
        .borrow_mut()
        .set(Key::text("ref"), original.clone());
    original.as_sequence().unwrap().borrow_mut().push(wrapper);
    for clone in both(&original) {
        let cell = clone.as_sequence().unwrap().borrow();
        assert!(cell.get(3).unwrap().is_identical(&clone));
        let through_record = field(&cell.get(4).unwrap(), "ref");
        assert!(through_record.is_identical(&clone));
    }
}

#[test]
fn shared_subgraphs_stay_shared() {
    let shared = Value::record();
    shared
        .as_record()
        .unwrap()
        .borrow_mut()
        .set(Key::text("tag"), Value::text("shared"));
    let original = Value::record();
    {
        let cell = original.as_record().unwrap();
        cell.borrow_mut().set(Key::text("x"), shared.clone());
        cell.borrow_mut().set(Key::text("y"), shared.clone());
    }
    for clone in both(&original) {
        let x = field(&clone, "x");
        let y = field(&clone, "y");
        assert!(x.is_identical(&y), "one original identity maps to one clone identity");
        assert!(!x.is_identical(&shared));
    }
}

#[test]
fn shared_subgraph_across_container_kinds() {
    // the same record reachable through a sequence, a dictionary and a
    // unique set must come out as a single cloned identity
    let shared = Value::record();
    shared
        .as_record()
        .unwrap()
        .borrow_mut()
        .set(Key::text("n"), Value::number(7.0));
    let sequence = Value::sequence_of(vec![shared.clone()]);
    let dictionary = Value::dictionary();
    dictionary
        .as_dictionary()
        .unwrap()
        .borrow_mut()
        .set(Value::text("at"), shared.clone());
    let uniques = Value::unique_set();
    uniques.as_unique_set().unwrap().borrow_mut().insert(shared.clone());
    let original = Value::sequence_of(vec![sequence, dictionary, uniques]);
    for clone in both(&original) {
        let cell = clone.as_sequence().unwrap().borrow();
        let through_sequence = cell.get(0).unwrap().as_sequence().unwrap().borrow().get(0).unwrap();
        let through_dictionary = cell
            .get(1)
            .unwrap()
            .as_dictionary()
            .unwrap()
            .borrow()
            .get(&Value::text("at"))
            .unwrap();
        let through_uniques = cell.get(2).unwrap().as_unique_set().unwrap().borrow().members()[0].clone();
        assert!(through_sequence.is_identical(&through_dictionary));
        assert!(through_dictionary.is_identical(&through_uniques));
        assert!(!through_sequence.is_identical(&shared));
    }
}

#[test]
fn cyclic_graphs_compare_equivalent_to_their_clones() {
    let original = Value::record();
    original
        .as_record()
        .unwrap()
        .borrow_mut()
        .set(Key::text("self"), original.clone());
    for clone in both(&original) {
        assert!(clone.equivalent(&original));
    }
}
