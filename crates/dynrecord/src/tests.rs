// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end tests across builder, instances and accessors.

use super::*;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

crate::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Address in "crm::model" {
        pub street: String,
        pub zip: u32,
    }
}

crate::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Customer in "crm::model" {
        pub id: i64 = "json:\"id\"",
        pub name: String = "json:\"name\"",
        pub email: Option<String>,
        pub address: Address,
        pub previous: Vec<Address>,
        pub joined: DateTime<Utc>,
        internal_score: f32,
    }
}

#[test]
fn test_full_workflow() {
    // 1. Build a runtime type mirroring part of Customer
    let summary_type = new_struct()
        .add_field("id", type_of::<i64>(), "")
        .add_field("name", type_of::<String>(), "")
        .add_field("address", type_of::<Address>(), "")
        .add_field("internal_score", type_of::<f32>(), "")
        .build();

    // 2. Populate it by name
    let mut summary = summary_type.new_instance();
    {
        let mut writer = AccessorMut::new(&mut summary);
        writer
            .field_mut("id")
            .expect("id")
            .set_int64(1001)
            .expect("set id");
        writer
            .field_mut("name")
            .expect("name")
            .set_string("Ada")
            .expect("set name");
        writer
            .field_mut("address")
            .expect("address")
            .set(Address {
                street: "1 Loop Rd".into(),
                zip: 12345,
            })
            .expect("set address");
        writer
            .field_mut("internal_score")
            .expect("score")
            .set_float32(0.9)
            .expect("set score");
    }

    // 3. Copy into a declared struct
    let mut customer = Customer::default();
    Accessor::new(&summary)
        .to_struct(&mut customer)
        .expect("copy");

    assert_eq!(customer.id, 1001);
    assert_eq!(customer.name, "Ada");
    assert_eq!(customer.address.zip, 12345);
    // Unexported on the destination
    assert_eq!(customer.internal_score, 0.0);
}

#[test]
fn test_extend_declared_struct() {
    let customer = Customer::default();
    let extended = extend_struct(&customer)
        .remove_field("previous")
        .add_field("Loyalty", type_of::<Option<u8>>(), "db:\"loyalty\"")
        .build();

    let names: Vec<_> = extended.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        ["id", "name", "email", "address", "joined", "internal_score", "Loyalty"]
    );
    // Tags and export status survive the copy
    assert_eq!(extended.fields()[0].tag, "json:\"id\"");
    assert!(!extended.fields()[5].is_exported());

    let instance = extended.new_instance();
    let reader = Accessor::new(&instance);
    assert_eq!(reader.field("Loyalty").and_then(|f| f.pointer_uint8()), None);
    assert_eq!(reader.field("Loyalty").map(|f| f.uint8()), Some(0));
}

#[test]
fn test_round_trip_through_runtime_record() {
    let joined = Utc
        .with_ymd_and_hms(2023, 1, 2, 3, 4, 5)
        .single()
        .expect("valid timestamp");
    let original = Customer {
        id: 7,
        name: "Grace".into(),
        email: Some("grace@example.com".into()),
        address: Address {
            street: "Main".into(),
            zip: 1,
        },
        previous: vec![Address::default()],
        joined,
        internal_score: 1.0,
    };

    let runtime = extend_struct(&original).build();
    let mut copy = runtime.new_instance();
    Accessor::new(&original)
        .to_struct(&mut copy)
        .expect("into runtime record");

    let reader = Accessor::new(&copy);
    assert_eq!(reader.field("email").map(|f| f.string()), Some("grace@example.com".into()));
    assert_eq!(reader.field("joined").map(|f| f.time()), Some(joined));
    // Unexported fields are never copied
    assert_eq!(reader.field("internal_score").map(|f| f.float32()), Some(0.0));

    let mut back = Customer::default();
    reader.to_struct(&mut back).expect("back into declared");
    assert_eq!(back.email, original.email);
    assert_eq!(back.previous, original.previous);
    assert_eq!(back.joined, joined);
}

#[test]
fn test_sequence_of_runtime_records() {
    let point = new_struct()
        .add_field("X", type_of::<i16>(), "")
        .add_field("Y", type_of::<i16>(), "")
        .build();

    let mut points = point.new_sequence();
    for i in 0..3i16 {
        let mut p = point.new_instance();
        p.set("X", i).expect("set X");
        p.set("Y", -i).expect("set Y");
        points.push(p).expect("push");
    }

    let accessor = Accessor::new(&points);
    let readers = accessor.to_sequence_of_accessors().expect("sequence");
    assert_eq!(readers.len(), 3);
    let ys: Vec<i64> = readers
        .iter()
        .filter_map(|r| r.field("Y").map(|f| f.int64()))
        .collect();
    assert_eq!(ys, [0, -1, -2]);

    // Writable fan-out updates the sequence in place
    let mut writer = AccessorMut::new(&mut points);
    for mut element in writer.to_sequence_of_accessors_mut().expect("sequence") {
        if let Some(mut x) = element.field_mut("X") {
            let doubled = x.int16() * 2;
            x.set_int16(doubled).expect("set X");
        }
    }
    let xs: Vec<_> = points
        .items()
        .iter()
        .filter_map(|v| v.get_field("X").cloned())
        .collect();
    assert_eq!(
        xs,
        [DynamicValue::I16(0), DynamicValue::I16(2), DynamicValue::I16(4)]
    );
}

#[test]
fn test_map_of_runtime_records() {
    let account = new_struct()
        .add_field("Balance", type_of::<u64>(), "")
        .build();

    let mut accounts = account.new_map(0u32);
    let mut first = account.new_instance();
    first.set("Balance", 10u64).expect("set");
    accounts.insert(1u32, first).expect("insert");
    accounts.insert(2u32, account.new_instance()).expect("insert");
    assert!(matches!(
        accounts.insert("three", account.new_instance()),
        Err(AccessError::InvalidKey(_))
    ));

    let accessor = Accessor::new(&accounts);
    let readers = accessor.to_map_of_accessors().expect("map");
    assert_eq!(readers.len(), 2);
    assert_eq!(
        readers
            .get(&MapKey::U32(1))
            .and_then(|r| r.field("Balance"))
            .map(|f| f.uint64()),
        Some(10)
    );
    assert!(accessor.to_sequence_of_accessors().is_none());
}

#[test]
fn test_declared_map_field() {
    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Inventory in "shop" {
            pub stock: HashMap<String, u32>,
            pub codes: [u8; 4],
        }
    }

    let mut inventory = Inventory::default();
    inventory.stock.insert("apple".into(), 3);

    let reader = Accessor::new(&inventory);
    let stock = reader.field("stock").expect("stock");
    assert_eq!(stock.get::<HashMap<String, u32>>(), Ok(inventory.stock.clone()));
    assert_eq!(
        stock.descriptor().type_desc.to_string(),
        "HashMap<String, u32>"
    );
    assert_eq!(
        reader.field("codes").map(|f| f.descriptor().type_desc.to_string()),
        Some("[u8; 4]".into())
    );
}

#[test]
fn test_merge_with_duplicates_resolves_to_last() {
    let left = new_struct()
        .add_field("Shared", type_of::<i32>(), "left")
        .build()
        .new_instance();
    let right = new_struct()
        .add_field("Shared", type_of::<String>(), "right")
        .build()
        .new_instance();

    let merged = merge_structs(&[&left, &right]).build();
    assert_eq!(merged.fields().len(), 2);

    let mut instance = merged.new_instance();
    let mut writer = AccessorMut::new(&mut instance);
    let mut shared = writer.field_mut("Shared").expect("shared");
    assert_eq!(shared.tag(), "right");
    shared.set_string("text").expect("last declaration is a string");
    assert_eq!(writer.fields().len(), 1);
}

#[test]
fn test_nested_runtime_records_keep_declared_layout() {
    let inner_x = new_struct().add_field("x", type_of::<i32>(), "").build();
    let inner_y = new_struct().add_field("y", type_of::<String>(), "").build();

    let dest_type = new_struct()
        .add_field("inner", inner_x.descriptor().clone(), "")
        .build();
    let source_type = new_struct()
        .add_field("inner", inner_y.descriptor().clone(), "")
        .build();

    // Direct writes of a differently shaped record are refused
    let mut direct = dest_type.new_instance();
    assert!(matches!(
        direct.set("inner", inner_y.new_instance()),
        Err(AccessError::TypeMismatch { .. })
    ));
    direct
        .set("inner", inner_x.new_instance())
        .expect("same layout");

    // Bulk copy skips the field and leaves the destination intact
    let mut source = source_type.new_instance();
    let mut inner = inner_y.new_instance();
    inner.set("y", "text").expect("set y");
    source.set("inner", inner).expect("set inner");

    let mut dest = dest_type.new_instance();
    Accessor::new(&source)
        .to_struct(&mut dest)
        .expect("copy");

    let held = dest.get_field("inner").expect("inner");
    assert_eq!(held.type_descriptor().to_string(), "struct { x: i32 }");
    assert_eq!(held.get_field("x"), Some(&DynamicValue::I32(0)));
    assert!(held.get_field("y").is_none());
}
