use tabula_core::{Connection, Driver, Failure, Options, Table, TableConfig, Value, record};

const TABLE: &str = "tabula_memberships";

pub async fn composite<D: Driver>(connection: &Connection<D>) {
    connection
        .query("DROP TABLE IF EXISTS ??", &[TABLE.into()])
        .await
        .expect("Failed to drop the memberships table");
    connection
        .query(
            "CREATE TABLE ?? (club VARCHAR(32) NOT NULL, id INTEGER NOT NULL, role VARCHAR(32), PRIMARY KEY (club, id))",
            &[TABLE.into()],
        )
        .await
        .expect("Failed to create the memberships table");
    let memberships = Table::with_connection(
        connection.clone(),
        TableConfig::new(TABLE)
            .primary_key(["club", "id"])
            .fields(["club", "id", "role"]),
    )
    .expect("Failed to create the memberships table handle");

    let replaced = memberships
        .replace(
            record! { "club" => "chess", "id" => 1, "role" => "member" },
            None,
        )
        .await
        .expect("Failed to insert a membership");
    assert!(replaced.is_inserted());
    memberships
        .replace(
            record! { "club" => "chess", "id" => 2, "role" => "member" },
            None,
        )
        .await
        .expect("Failed to insert a membership");
    let replaced = memberships
        .replace(
            record! { "id" => 1, "club" => "chess", "role" => "captain" },
            None,
        )
        .await
        .expect("Failed to update a membership");
    assert!(!replaced.is_inserted());

    let row = memberships
        .find_by_pk(vec![Value::from("chess"), Value::from(1)])
        .await
        .expect("Failed to find by composite key")
        .expect("Membership must exist");
    assert_eq!(row.get_column("role"), Some(&Value::from("captain")));
    assert_eq!(
        memberships
            .find_one("role", record! { "club" => "chess", "id" => 2 }, Options::None)
            .await
            .expect("Failed to read the role"),
        Some(Value::from("member"))
    );

    let error = memberships
        .find_by_pk(record! { "club" => "chess" })
        .await
        .expect_err("A partial composite key must be rejected");
    assert_eq!(
        Failure::of(&error),
        Some(&Failure::InvalidCall(
            "missing 'id' for composite primary key".into()
        ))
    );
    let error = memberships
        .remove(5)
        .await
        .expect_err("A scalar cannot identify a composite key");
    assert!(Failure::of(&error).is_some_and(Failure::is_invalid_call));

    let affected = memberships
        .remove(record! { "club" => "chess" })
        .await
        .expect("Failed to delete the memberships");
    assert_eq!(affected.rows_affected, 2);
}
