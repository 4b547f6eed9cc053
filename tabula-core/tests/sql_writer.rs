#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tabula_core::{
        Clauses, Condition, GenericSqlWriter, Options, Predicate, PrimaryKey, SqlWriter, Value,
        record,
    };
    use time::{
        Time,
        macros::{date, datetime},
    };
    use uuid::Uuid;

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();

    fn value(value: impl Into<Value>) -> String {
        let mut out = String::new();
        WRITER.write_value(&mut out, &value.into());
        out
    }

    #[test]
    fn values() {
        assert_eq!(value(Value::Null), "NULL");
        assert_eq!(value(true), "true");
        assert_eq!(value(-12i8), "-12");
        assert_eq!(value(u64::MAX), "18446744073709551615");
        assert_eq!(value(1.5), "1.5");
        assert_eq!(value(f64::NAN), "NULL");
        assert_eq!(value(Decimal::from_str("12.340").unwrap()), "12.340");
        assert_eq!(value("it's"), "'it''s'");
        assert_eq!(value(Box::<[u8]>::from([0xCA, 0xFE, 0x01])), "X'CAFE01'");
        assert_eq!(value(date!(2024 - 02 - 29)), "'2024-02-29'");
        assert_eq!(
            value(Time::from_hms_micro(7, 5, 9, 120_000).unwrap()),
            "'07:05:09.12'"
        );
        assert_eq!(
            value(datetime!(1999-12-31 23:59:59)),
            "'1999-12-31 23:59:59'"
        );
        assert_eq!(
            value(Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap()),
            "'67e55044-10b1-426f-9247-bb680e5fe0c8'"
        );
        assert_eq!(value(vec![1, 2]), "(1, 2)");
        assert_eq!(value(Option::<i32>::None), "NULL");
    }

    #[test]
    fn identifiers() {
        let mut out = String::new();
        WRITER.write_identifier_quoted(&mut out, r#"we"ird"#);
        assert_eq!(out, r#""we""ird""#);
    }

    #[test]
    fn template() {
        let mut out = String::new();
        WRITER.write_template(
            &mut out,
            "SELECT ?? FROM ?? WHERE name = ? AND id IN ? AND x = ?",
            &[
                Value::List(vec!["id".into(), "name".into()]),
                "users".into(),
                "O'Neil".into(),
                Value::List(vec![1.into(), 2.into()]),
            ],
        );
        assert_eq!(
            out,
            r#"SELECT "id", "name" FROM "users" WHERE name = 'O''Neil' AND id IN (1, 2) AND x = ?"#
        );
    }

    #[test]
    fn select() {
        let mut out = String::new();
        WRITER
            .write_select(
                &mut out,
                "users",
                &PrimaryKey::default(),
                &Condition::from(vec![
                    ("age", Predicate::new(">", 18).unwrap()),
                    ("name", Predicate::new("LIKE", "ada").unwrap()),
                ]),
                &Options::from(Clauses::new().order_by("name DESC").limit(0, 10)),
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                SELECT * FROM "users" WHERE ("age" > 18) AND ("name" LIKE '%ada%') ORDER BY name DESC LIMIT 0, 10
            "#}
            .trim()
        );
    }

    #[test]
    fn insert_update_delete() {
        let key = PrimaryKey::default();
        let mut out = String::new();
        WRITER.write_insert(&mut out, "users", &record! { "name" => "Ada", "age" => 36 });
        assert_eq!(out, r#"INSERT INTO "users" SET "name" = 'Ada', "age" = 36"#);

        out.clear();
        WRITER
            .write_update(
                &mut out,
                "users",
                &record! { "age" => 37 },
                &key,
                &Condition::from(1),
            )
            .unwrap();
        assert_eq!(out, r#"UPDATE "users" SET "age" = 37 WHERE ("id" = 1)"#);

        out.clear();
        WRITER
            .write_delete(&mut out, "users", &key, &Condition::None)
            .unwrap();
        assert_eq!(out, r#"DELETE FROM "users""#);

        out.clear();
        let error = WRITER
            .write_delete(&mut out, "users", &PrimaryKey::from(["a", "b"]), &Condition::from(1))
            .unwrap_err();
        assert!(error.to_string().contains("composite primary key"));
    }

    #[test]
    fn transactions() {
        let mut out = String::new();
        WRITER.write_transaction_begin(&mut out);
        out.push_str("; ");
        WRITER.write_transaction_commit(&mut out);
        out.push_str("; ");
        WRITER.write_transaction_rollback(&mut out);
        assert_eq!(out, "START TRANSACTION; COMMIT; ROLLBACK");
    }
}
