use crate::decode_value;
use mysql_async::FromRowError;

pub(crate) struct RowWrap(pub(crate) tabula_core::RowLabeled);

impl mysql_async::prelude::FromRow for RowWrap {
    fn from_row_opt(mut row: mysql_async::Row) -> Result<Self, FromRowError>
    where
        Self: Sized,
    {
        let columns = row.columns();
        let names: tabula_core::RowNames = columns
            .iter()
            .map(|v| v.name_str().into_owned())
            .collect();
        let mut values = Vec::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let value = row
                .take::<mysql_async::Value, _>(i)
                .unwrap_or(mysql_async::Value::NULL);
            match decode_value(value, column) {
                Ok(v) => values.push(v),
                Err(e) => {
                    log::error!(
                        "Cannot decode column `{}`: {:?}",
                        column.name_str(),
                        e.0
                    );
                    return Err(FromRowError(row));
                }
            }
        }
        Ok(RowWrap(tabula_core::RowLabeled::new(names, values.into())))
    }
}
