use tabula_core::{Connection, Driver, Options, Table, TableConfig, record};

const TABLE: &str = "tabula_ledger";

pub async fn transaction<D: Driver>(connection: &Connection<D>) {
    connection
        .query("DROP TABLE IF EXISTS ??", &[TABLE.into()])
        .await
        .expect("Failed to drop the ledger table");
    connection
        .query(
            "CREATE TABLE ?? (id INTEGER PRIMARY KEY, amount INTEGER NOT NULL)",
            &[TABLE.into()],
        )
        .await
        .expect("Failed to create the ledger table");
    let ledger = Table::with_connection(
        connection.clone(),
        TableConfig::new(TABLE).fields(["id", "amount"]),
    )
    .expect("Failed to create the ledger table handle");

    connection
        .begin_transaction()
        .await
        .expect("Failed to begin a transaction");
    ledger
        .insert(record! { "id" => 1, "amount" => 100 }, None)
        .await
        .expect("Failed to insert inside the transaction");
    connection
        .rollback()
        .await
        .expect("Failed to rollback the transaction");
    assert!(
        ledger
            .find_by_pk(1)
            .await
            .expect("Failed to look for the rolled back row")
            .is_none()
    );

    connection
        .begin_transaction()
        .await
        .expect("Failed to begin a transaction");
    ledger
        .insert(record! { "id" => 2, "amount" => 50 }, None)
        .await
        .expect("Failed to insert inside the transaction");
    connection
        .commit()
        .await
        .expect("Failed to commit the transaction");
    assert_eq!(
        ledger
            .find_all(Options::None)
            .await
            .expect("Failed to list the ledger")
            .len(),
        1
    );
}
