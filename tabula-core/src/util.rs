use std::borrow::Cow;

/// Writes `values` into `out` calling `f` for each one, `separator` goes between the
/// items that actually produced output.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Shortens long text (queries, values) for logs and error messages.
pub fn truncate_long(value: &str) -> Cow<'_, str> {
    const LIMIT: usize = 497;
    match value.char_indices().nth(LIMIT) {
        Some((end, _)) => Cow::Owned(format!("{}...", value[..end].trim_end())),
        None => Cow::Borrowed(value),
    }
}

/// Formats a query for logs and error contexts.
#[macro_export]
macro_rules! printable_query {
    ($query:expr) => {
        $crate::truncate_long(::std::convert::AsRef::<str>::as_ref(&$query))
    };
}
