//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use objectset_table::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
}

pub fn person(name: &str, email: &str, age: Option<i64>) -> Person {
    Person {
        name: name.to_string(),
        email: email.to_string(),
        age,
    }
}

pub fn people() -> Vec<Person> {
    vec![
        person("Ada", "ada@example.com", Some(36)),
        person("Bob", "bob@example.com", None),
        person("Cy", "cy@example.com", Some(21)),
        person("Dee", "dee@example.com", Some(52)),
        person("Eve", "eve@example.com", None),
    ]
}

pub fn columns() -> Vec<ColumnDef<Person>> {
    vec![
        ColumnDef::new("name")
            .title("Name")
            .editable()
            .sortable()
            .getter(|p: &Person| p.name.clone().into())
            .setter(|p, v| p.name = v.to_string())
            .validate_with("required"),
        ColumnDef::new("email")
            .title("Email")
            .editable()
            .getter(|p: &Person| p.email.clone().into())
            .setter(|p, v| p.email = v.to_string())
            .validate_with("email"),
        ColumnDef::new("age")
            .title("Age")
            .column_type(ColumnType::Number)
            .sortable()
            .getter(|p: &Person| p.age.into())
            .validate_with("range")
            .props(|props| {
                props.min = Some(0.0);
                props.max = Some(150.0);
            }),
    ]
}

pub fn table(config: TableConfig<Person>) -> ObjectSetTable<Person> {
    ObjectSetTable::new(columns(), people(), config).unwrap()
}

pub fn names(api: &TableApi<Person>) -> Vec<String> {
    api.get_state().data.iter().map(|r| r.data.name.clone()).collect()
}
