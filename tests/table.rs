#[cfg(test)]
mod tests {
    use indoc::indoc;
    use std::{
        result::Result as StdResult,
        sync::{Arc, Mutex},
    };
    use tabula::{
        Clauses, Condition, Constraint, ConstraintMap, Constraints, Error, Failure, Options,
        Predicate, PrimaryKey, Replaced, RowLabeled, RowsAffected, Table, TableConfig,
        TableSettings, Value, callback, record,
    };
    use tabula_tests::{MockDriver, init_logs, rows_of, silent_logs};

    fn users(driver: &MockDriver) -> Table<MockDriver> {
        Table::new(
            driver.clone(),
            TableConfig::new("users")
                .constraint("id", Constraint::new().presence())
                .constraint("name", Constraint::new().presence())
                .fields(["age"]),
        )
        .expect("Valid configuration")
    }

    #[tokio::test]
    async fn search_compiles_condition_and_options() {
        init_logs();
        let driver = MockDriver::new();
        let table = users(&driver);
        table
            .search(
                vec![
                    ("name", Predicate::new("LIKE", "spider").unwrap()),
                    ("age", Predicate::new(">=", 18).unwrap().or()),
                ],
                Clauses::new().order_by("name").limit(20, 10),
            )
            .await
            .unwrap();
        assert_eq!(
            driver.last_statement().unwrap(),
            indoc! {r#"
                SELECT * FROM "users" WHERE ("name" LIKE '%spider%') OR ("age" >= 18) ORDER BY name LIMIT 20, 10
            "#}
            .trim()
        );
    }

    #[tokio::test]
    async fn scalar_condition_is_the_primary_key() {
        let driver = MockDriver::new();
        let table = users(&driver);
        table.search(5, Options::None).await.unwrap();
        table.search(record! { "id" => 5 }, Options::None).await.unwrap();
        let statements = driver.statements();
        assert_eq!(statements[0], statements[1]);
        assert_eq!(statements[0], r#"SELECT * FROM "users" WHERE ("id" = 5)"#);
    }

    #[tokio::test]
    async fn empty_condition_has_no_where() {
        let driver = MockDriver::new();
        let table = users(&driver);
        table.find_all(Options::None).await.unwrap();
        table.search("", Options::None).await.unwrap();
        table.search(record! {}, Options::None).await.unwrap();
        for statement in driver.statements() {
            assert_eq!(statement, r#"SELECT * FROM "users""#);
        }
    }

    #[tokio::test]
    async fn find_returns_the_first_row_or_none() {
        let driver = MockDriver::new();
        let table = users(&driver);
        driver.respond_rows(
            &["id", "name"],
            vec![vec![1.into(), "Ada".into()], vec![2.into(), "Grace".into()]],
        );
        let row = table
            .find(Condition::None, Clauses::new().order_by("id"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.get_column("name"), Some(&Value::from("Ada")));
        assert_eq!(
            driver.last_statement().unwrap(),
            r#"SELECT * FROM "users" ORDER BY id LIMIT 1"#
        );
        assert_eq!(table.find(99, Options::None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_one_distinguishes_absent_from_null() {
        let driver = MockDriver::new();
        let table = users(&driver);
        driver.respond_rows(&["id", "email"], vec![vec![1.into(), Value::Null]]);
        assert_eq!(
            table.find_one("email", 1, Options::None).await.unwrap(),
            Some(Value::Null)
        );
        assert_eq!(
            table.find_one("email", 2, Options::None).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn find_by_pk() {
        let driver = MockDriver::new();
        let table = users(&driver);
        table.find_by_pk("abc").await.unwrap();
        table
            .find_by_pk(record! { "id" => 4, "name" => "ignored" })
            .await
            .unwrap();
        assert_eq!(
            driver.statements(),
            [
                r#"SELECT * FROM "users" WHERE ("id" = 'abc') LIMIT 1"#,
                r#"SELECT * FROM "users" WHERE ("id" = 4) LIMIT 1"#,
            ]
        );
        let error = table.find_by_pk(record! { "name" => "x" }).await.unwrap_err();
        assert_eq!(
            Failure::of(&error),
            Some(&Failure::InvalidParameter("missing primary key".into()))
        );
        assert_eq!(driver.executions(), 2);
    }

    #[tokio::test]
    async fn insert_keeps_only_allowed_fields() {
        let driver = MockDriver::new();
        let table = users(&driver);
        driver.respond(RowsAffected {
            rows_affected: 1,
            last_affected_id: Some(8),
        });
        let affected = table
            .insert(
                record! { "id" => 8, "name" => "Ada", "admin" => true, "age" => 36 },
                None,
            )
            .await
            .unwrap();
        assert_eq!(affected.last_affected_id, Some(8));
        assert_eq!(
            driver.last_statement().unwrap(),
            r#"INSERT INTO "users" SET "id" = 8, "name" = 'Ada', "age" = 36"#
        );

        let error = table
            .insert(record! { "admin" => true }, None)
            .await
            .unwrap_err();
        assert!(Failure::of(&error).unwrap().is_invalid_parameter());
        assert_eq!(driver.executions(), 1);
    }

    #[tokio::test]
    async fn validation_runs_before_any_statement() {
        let driver = MockDriver::new();
        let table = users(&driver);
        let error = table
            .insert(record! { "id" => 1 }, Some(Constraints::Configured))
            .await
            .unwrap_err();
        let violations = Failure::of(&error).and_then(Failure::violations).unwrap();
        assert_eq!(violations["name"], ["name can't be blank"]);
        assert_eq!(driver.executions(), 0);

        let relaxed = ConstraintMap::from_iter([("name".to_string(), Constraint::new())]);
        table
            .insert(record! { "id" => 1 }, Some(Constraints::Merge(relaxed)))
            .await
            .unwrap();
        assert_eq!(driver.executions(), 1);
    }

    #[tokio::test]
    async fn update_validates_the_condition() {
        let driver = MockDriver::new();
        let table = users(&driver);
        let error = table
            .update(
                record! { "id" => 3 },
                record! { "name" => "Ada" },
                Some(Constraints::Configured),
            )
            .await
            .unwrap_err();
        assert!(Failure::of(&error).and_then(Failure::violations).is_some());
        assert_eq!(driver.executions(), 0);

        table
            .update(3, record! { "name" => "Ada", "admin" => true }, None)
            .await
            .unwrap();
        assert_eq!(
            driver.last_statement().unwrap(),
            r#"UPDATE "users" SET "name" = 'Ada' WHERE ("id" = 3)"#
        );
    }

    #[tokio::test]
    async fn replace_routes_on_existence() {
        let driver = MockDriver::new();
        let table = users(&driver);
        driver
            .respond_rows(&["id", "name"], vec![vec![7.into(), "Old".into()]])
            .respond_affected(1);
        let replaced = table
            .replace(record! { "id" => 7, "name" => "New" }, None)
            .await
            .unwrap();
        assert!(matches!(replaced, Replaced::Updated(..)));
        assert_eq!(
            driver.statements(),
            [
                r#"SELECT * FROM "users" WHERE ("id" = 7) LIMIT 1"#,
                r#"UPDATE "users" SET "id" = 7, "name" = 'New' WHERE ("id" = 7)"#,
            ]
        );

        let driver = MockDriver::new();
        let table = users(&driver);
        driver.respond_rows(&["id"], vec![]).respond_affected(1);
        let replaced = table
            .replace(record! { "id" => 99, "name" => "New" }, None)
            .await
            .unwrap();
        assert_eq!(
            replaced,
            Replaced::Inserted(RowsAffected {
                rows_affected: 1,
                last_affected_id: None
            })
        );
        assert_eq!(
            driver.last_statement().unwrap(),
            r#"INSERT INTO "users" SET "id" = 99, "name" = 'New'"#
        );
    }

    #[tokio::test]
    async fn composite_key_failures_emit_nothing() {
        let driver = MockDriver::new();
        let table = Table::new(
            driver.clone(),
            TableConfig::new("memberships")
                .primary_key(["club", "id"])
                .fields(["club", "id", "role"]),
        )
        .unwrap();
        let error = table
            .replace(record! { "club" => "chess", "role" => "captain" }, None)
            .await
            .unwrap_err();
        assert_eq!(
            Failure::of(&error),
            Some(&Failure::InvalidCall(
                "missing 'id' for composite primary key".into()
            ))
        );
        let error = table.find(7, Options::None).await.unwrap_err();
        assert!(Failure::of(&error).unwrap().is_invalid_call());
        assert_eq!(driver.executions(), 0);
    }

    #[tokio::test]
    async fn unknown_operator_emits_nothing() {
        let driver = MockDriver::new();
        let table = users(&driver);
        for parts in [
            vec![Value::from("CONTAINS"), Value::from("x")],
            vec![Value::from("=")],
        ] {
            let error = match Predicate::try_from(parts) {
                Ok(predicate) => table
                    .search(vec![("name", predicate)], Options::None)
                    .await
                    .unwrap_err(),
                Err(e) => e,
            };
            assert!(Failure::of(&error).unwrap().is_invalid_parameter());
        }
        assert_eq!(driver.executions(), 0);
    }

    #[tokio::test]
    async fn remove_without_condition_deletes_everything() {
        let driver = MockDriver::new();
        let table = users(&driver);
        silent_logs! {
            table.remove(Condition::None).await.unwrap();
        }
        table.delete(record! { "name" => "Ada" }).await.unwrap();
        assert_eq!(
            driver.statements(),
            [
                r#"DELETE FROM "users""#,
                r#"DELETE FROM "users" WHERE ("name" = 'Ada')"#,
            ]
        );
    }

    #[tokio::test]
    async fn query_template() {
        let driver = MockDriver::new();
        let table = users(&driver);
        table
            .query(
                "SELECT ?? FROM ?? WHERE id = ?",
                &[Value::from("name"), Value::from("users"), Value::from("x'y")],
            )
            .await
            .unwrap();
        assert_eq!(
            driver.last_statement().unwrap(),
            r#"SELECT "name" FROM "users" WHERE id = 'x''y'"#
        );
    }

    #[tokio::test]
    async fn callback_and_deferred_see_the_same_success() {
        let driver = MockDriver::new().threaded();
        let table = users(&driver);
        driver.respond(rows_of(&["id"], vec![vec![1.into()], vec![2.into()]]));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = seen.clone();
        let rows = table
            .operations()
            .search(
                Condition::None,
                Options::None,
                callback(move |result: StdResult<&Vec<RowLabeled>, &Error>| {
                    recorded.lock().unwrap().push(result.map(|v| v.len()).ok());
                }),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(*seen.lock().unwrap(), [Some(2)]);
        assert_eq!(driver.executions(), 1);
    }

    #[tokio::test]
    async fn callback_and_deferred_see_the_same_failure() {
        let driver = MockDriver::new();
        let table = users(&driver);
        driver.fail("connection lost");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = seen.clone();
        let error = silent_logs! {
            table
                .operations()
                .remove(
                    1,
                    callback(move |result| {
                        recorded
                            .lock()
                            .unwrap()
                            .push(result.map_err(|e| e.to_string()).err());
                    }),
                )
                .await
                .unwrap_err()
        };
        assert_eq!(error.to_string(), "connection lost");
        assert_eq!(*seen.lock().unwrap(), [Some("connection lost".to_string())]);
        assert_eq!(driver.executions(), 1);
    }

    #[tokio::test]
    async fn callbacks_observe_rejected_calls() {
        let driver = MockDriver::new();
        let table = users(&driver);
        let seen = Arc::new(Mutex::new(0));
        let recorded = seen.clone();
        let result = table
            .operations()
            .insert(
                record! { "id" => 1 },
                Some(Constraints::Configured),
                callback(move |result| {
                    assert!(result.is_err());
                    *recorded.lock().unwrap() += 1;
                }),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(driver.executions(), 0);
    }

    #[tokio::test]
    async fn dropped_completion_settles_with_an_error() {
        let driver = MockDriver::new();
        let table = users(&driver);
        driver.drop_next();
        let result = silent_logs! { table.find_all(Options::None).await };
        assert!(result.is_err());
    }

    #[test]
    fn operations_outside_a_runtime() {
        let driver = MockDriver::new();
        let table = users(&driver);
        let seen = Arc::new(Mutex::new(None));
        let recorded = seen.clone();
        let deferred = table.operations().find_all(
            Options::None,
            callback(move |result: StdResult<&Vec<RowLabeled>, &Error>| {
                *recorded.lock().unwrap() = result.err().map(|e| e.to_string());
            }),
        );
        let error = futures::executor::block_on(deferred).unwrap_err();
        assert!(Failure::of(&error).is_some_and(Failure::is_invalid_call));
        assert_eq!(*seen.lock().unwrap(), Some(error.to_string()));
        assert_eq!(driver.executions(), 0);
    }

    #[tokio::test]
    async fn panicking_callback_keeps_the_result() {
        let driver = MockDriver::new();
        let table = users(&driver);
        driver.respond(rows_of(&["id"], vec![vec![1.into()]]));
        let rows = silent_logs! {
            table
                .operations()
                .find_all(
                    Options::None,
                    callback(|_: StdResult<&Vec<RowLabeled>, &Error>| panic!("callback failure")),
                )
                .await
        }
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(driver.executions(), 1);
    }

    #[tokio::test]
    async fn transactions_and_end() {
        let driver = MockDriver::new();
        let table = users(&driver);
        let connection = table.connection();
        connection.begin_transaction().await.unwrap();
        connection.commit().await.unwrap();
        connection.rollback().await.unwrap();
        connection.end().await.unwrap();
        assert_eq!(
            driver.statements(),
            ["START TRANSACTION", "COMMIT", "ROLLBACK"]
        );
        assert_eq!(driver.ends(), 1);
    }

    #[test]
    fn settings() {
        let settings: TableSettings = serde_json::from_str(
            r#"{ "table": "users", "primaryKey": "uuid", "fields": ["name"] }"#,
        )
        .unwrap();
        let config = TableConfig::try_from(settings).unwrap();
        assert_eq!(config.primary_key, PrimaryKey::from("uuid"));
        assert!(config.constraints.contains_key("name"));

        let settings: TableSettings = serde_json::from_str(r#"{ "table": "" }"#).unwrap();
        let error = TableConfig::try_from(settings).unwrap_err();
        assert!(Failure::of(&error).unwrap().is_invalid_parameter());
        assert!(Table::new(MockDriver::new(), TableConfig::new(" ")).is_err());
    }
}
