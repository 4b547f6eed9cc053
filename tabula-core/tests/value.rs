#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tabula_core::{AsValue, RowLabeled, Value, record};

    #[test]
    fn integers_accept_compatible_variants() {
        assert_eq!(i32::try_from_value(Value::UInt64(12)).unwrap(), 12);
        assert_eq!(u8::try_from_value(Value::Varchar(" 200 ".into())).unwrap(), 200);
        assert_eq!(
            i64::try_from_value(Value::Decimal(Decimal::from_str("45.000").unwrap())).unwrap(),
            45
        );
        assert_eq!(u16::try_from_value(Value::Boolean(true)).unwrap(), 1);
        assert!(u8::try_from_value(Value::Int64(256)).is_err());
        assert!(i8::try_from_value(Value::Int64(-129)).is_err());
        assert!(u32::try_from_value(Value::Int64(-1)).is_err());
        assert!(i64::try_from_value(Value::Decimal(Decimal::from_str("1.5").unwrap())).is_err());
        assert!(i64::try_from_value(Value::Null).is_err());
    }

    #[test]
    fn options_and_lists() {
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(Some(3u8).as_value(), Value::UInt64(3));
        assert_eq!(
            Vec::<String>::try_from_value(Value::List(vec!["a".into(), "b".into()])).unwrap(),
            ["a", "b"]
        );
        assert!(!Value::List(vec![]).is_scalar());
        assert!(Value::from(1).is_scalar());
    }

    #[test]
    fn display_truncates_long_strings() {
        let long = "é".repeat(600);
        let shown = Value::Varchar(long).to_string();
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 500);
        assert_eq!(Value::Blob([1u8, 2].into()).to_string(), "<2 bytes>");
        assert_eq!(
            Value::List(vec![1.into(), Value::Null]).to_string(),
            "[1, NULL]"
        );
    }

    #[test]
    fn rows_become_records() {
        let row = RowLabeled::new(
            ["id".to_string(), "name".to_string()].into(),
            [Value::from(1), Value::from("Ada")].into(),
        );
        assert_eq!(row.get_column("name"), Some(&Value::from("Ada")));
        assert_eq!(row.get_column("missing"), None);
        assert_eq!(row.into_record(), record! { "id" => 1, "name" => "Ada" });
    }
}
