
#[cfg(test)]
mod tests {
    use crate::init::init;
    use tabula_core::{Condition, PrimaryKey, SqlWriter, Value};
    use tabula_mysql::{MySQLDriver, MySQLSqlWriter};
    use tabula_tests::{execute_tests, init_logs};

    #[tokio::test]
    async fn mysql() {
        init_logs();
        let (url, _container) = init().await;
        let driver = MySQLDriver::connect(url)
            .await
            .expect("Could not open the database");
        execute_tests(driver).await;
    }

    #[tokio::test]
    async fn wrong_url() {
        init_logs();
        let result = tabula_tests::silent_logs! {
            MySQLDriver::connect("postgres://localhost/db").await
        };
        let error = result.err().expect("Connection should be refused");
        assert!(format!("{error:#}").contains("must start with `mysql://`"));
    }

    #[test]
    fn dialect() {
        let writer = MySQLSqlWriter::default();
        let mut out = String::new();
        writer.write_identifier_quoted(&mut out, "shop.order`s");
        assert_eq!(out, "`shop`.`order``s`");

        out.clear();
        writer.write_value(&mut out, &Value::from("it's a \"test\"\\\n\0"));
        assert_eq!(out, r#"'it\'s a \"test\"\\\n\0'"#);

        let compiled = Condition::from(vec![("name", "x")])
            .compile(&writer, &PrimaryKey::default())
            .unwrap();
        assert_eq!(compiled, " WHERE (`name` = 'x')");
    }
}
