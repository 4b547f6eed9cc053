use mysql_async::{
    Column, FromValueError,
    consts::{ColumnFlags, ColumnType},
    from_value_opt,
};
use tabula_core::Value;
use time::{Date, PrimitiveDateTime, Time};

const BINARY_CHARSET: u16 = 63;

/// Converts a text protocol cell into a [`Value`] using the column metadata.
pub(crate) fn decode_value(
    value: mysql_async::Value,
    column: &Column,
) -> Result<Value, FromValueError> {
    if value == mysql_async::Value::NULL {
        return Ok(Value::Null);
    }
    let unsigned = column.flags().contains(ColumnFlags::UNSIGNED_FLAG);
    Ok(match column.column_type() {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => {
            if unsigned {
                Value::UInt64(from_value_opt(value)?)
            } else {
                Value::Int64(from_value_opt(value)?)
            }
        }
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
            Value::Float64(from_value_opt(value)?)
        }
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            Value::Decimal(from_value_opt(value)?)
        }
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            Value::Date(from_value_opt::<Date>(value)?)
        }
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => {
            Value::Timestamp(from_value_opt::<PrimitiveDateTime>(value)?)
        }
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => {
            Value::Time(from_value_opt::<Time>(value)?)
        }
        _ => match value {
            mysql_async::Value::Bytes(v) if column.character_set() == BINARY_CHARSET => {
                Value::Blob(v.into())
            }
            mysql_async::Value::Bytes(v) => match String::from_utf8(v) {
                Ok(v) => Value::Varchar(v),
                Err(e) => Value::Blob(e.into_bytes().into()),
            },
            mysql_async::Value::Int(v) => Value::Int64(v),
            mysql_async::Value::UInt(v) => Value::UInt64(v),
            mysql_async::Value::Float(v) => Value::Float64(v.into()),
            mysql_async::Value::Double(v) => Value::Float64(v),
            value => Value::Varchar(from_value_opt(value)?),
        },
    })
}
