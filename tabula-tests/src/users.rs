use std::{
    result::Result as StdResult,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tabula_core::{
    AsValue, Clauses, Condition, Connection, Constraint, Constraints, Driver, Error, Failure,
    Length, Numericality, Options, Predicate, Replaced, RowLabeled, Table, TableConfig, Value,
    callback, record,
};

const TABLE: &str = "tabula_users";

fn config() -> TableConfig {
    TableConfig::new(TABLE)
        .constraint("id", Constraint::new().presence())
        .constraint(
            "name",
            Constraint::new().presence().length(Length {
                maximum: Some(64),
                ..Default::default()
            }),
        )
        .constraint(
            "age",
            Constraint::new().numericality(Numericality {
                only_integer: true,
                greater_than_or_equal_to: Some(0.0),
                ..Default::default()
            }),
        )
        .fields(["email"])
}

fn int(value: Option<Value>) -> Option<i64> {
    value.map(|v| i64::try_from_value(v).expect("Expected an integer"))
}

pub async fn users<D: Driver>(connection: &Connection<D>) {
    connection
        .query("DROP TABLE IF EXISTS ??", &[TABLE.into()])
        .await
        .expect("Failed to drop the users table");
    connection
        .query(
            "CREATE TABLE ?? (id INTEGER PRIMARY KEY, name VARCHAR(64) NOT NULL, age INTEGER, email VARCHAR(128))",
            &[TABLE.into()],
        )
        .await
        .expect("Failed to create the users table");
    let users = Table::with_connection(connection.clone(), config())
        .expect("Failed to create the users table handle");

    // Insert
    for data in [
        record! { "id" => 1, "name" => "Ada", "age" => 36, "email" => "ada@example.com" },
        record! { "id" => 2, "name" => "Grace", "age" => 85, "email" => Value::Null },
        record! { "id" => 3, "name" => "Dennis", "age" => 70, "nickname" => "dmr" },
    ] {
        let affected = users
            .insert(data, Some(Constraints::Configured))
            .await
            .expect("Failed to insert a user");
        assert_eq!(affected.rows_affected, 1);
    }
    let error = users
        .insert(
            record! { "id" => 4, "name" => "", "age" => 1 },
            Some(Constraints::Configured),
        )
        .await
        .expect_err("An empty name must be rejected");
    let violations = Failure::of(&error)
        .and_then(Failure::violations)
        .expect("Expected a validation failure");
    assert!(violations.contains_key("name"));
    assert_eq!(
        users
            .find_all(Options::None)
            .await
            .expect("Failed to list the users")
            .len(),
        3
    );

    // Find
    let grace = users
        .find_by_pk(2)
        .await
        .expect("Failed to find by primary key")
        .expect("User 2 must exist");
    assert_eq!(grace.get_column("name"), Some(&Value::from("Grace")));
    assert_eq!(
        users
            .find_one("email", 2, Options::None)
            .await
            .expect("Failed to query the email"),
        Some(Value::Null)
    );
    assert_eq!(
        users
            .find_one("email", 99, Options::None)
            .await
            .expect("Failed to query the email"),
        None
    );
    assert!(
        users
            .find(record! { "name" => "Nobody" }, Options::None)
            .await
            .expect("Failed to find")
            .is_none()
    );

    // Search
    let found = users
        .search(
            vec![("name", Predicate::like("a"))],
            Clauses::new().order_by("id DESC"),
        )
        .await
        .expect("Failed to search");
    let names = found
        .iter()
        .filter_map(|row| row.get_column("name")?.as_str().map(str::to_string))
        .collect::<Vec<_>>();
    assert_eq!(names, ["Grace", "Ada"]);
    let page = users
        .find_all(Clauses::new().order_by("id").limit(1, 1))
        .await
        .expect("Failed to page the users");
    assert_eq!(page.len(), 1);
    assert_eq!(int(page[0].get_column("id").cloned()), Some(2));
    let older = users
        .search(
            Condition::List(vec![
                ("age".into(), Predicate::new(">", 80).expect("Valid operator")),
                ("id".into(), Predicate::new("=", 1).expect("Valid operator").or()),
            ]),
            "ORDER BY id",
        )
        .await
        .expect("Failed to search with a disjunction");
    assert_eq!(older.len(), 2);

    // Update
    let affected = users
        .update(1, record! { "age" => 37, "unknown" => 1 }, None)
        .await
        .expect("Failed to update");
    assert_eq!(affected.rows_affected, 1);
    assert_eq!(
        int(users
            .find_one("age", 1, Options::None)
            .await
            .expect("Failed to read the age")),
        Some(37)
    );

    // Replace
    let replaced = users
        .replace(
            record! { "id" => 1, "name" => "Ada Lovelace", "age" => 36 },
            None,
        )
        .await
        .expect("Failed to replace an existing user");
    assert!(matches!(replaced, Replaced::Updated(..)));
    let replaced = users
        .replace(record! { "id" => 10, "name" => "Ken", "age" => 80 }, None)
        .await
        .expect("Failed to replace a missing user");
    assert!(replaced.is_inserted());
    assert_eq!(
        users
            .find_one("name", 1, Options::None)
            .await
            .expect("Failed to read the name"),
        Some(Value::from("Ada Lovelace"))
    );

    // Callbacks
    let operations = users.operations();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let rows = operations
        .find_all(
            Options::None,
            callback(move |result: StdResult<&Vec<RowLabeled>, &Error>| {
                assert_eq!(result.map(Vec::len).ok(), Some(4));
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .await
        .expect("Failed to list the users through the callback surface");
    assert_eq!(rows.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Delete
    let affected = users
        .remove(record! { "id" => 10 })
        .await
        .expect("Failed to delete a user");
    assert_eq!(affected.rows_affected, 1);
    users
        .delete(Condition::None)
        .await
        .expect("Failed to delete every user");
    assert!(
        users
            .find_all(Options::None)
            .await
            .expect("Failed to list the users")
            .is_empty()
    );
}
