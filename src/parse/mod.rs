pub mod ddl;
pub mod discover;

pub use ddl::{parse, parse_columns, table_name};
pub use discover::{find_migrations, load_databases, load_migrations, parse_file};

/// `user_profile` → `UserProfile`.
///
/// Splits on `_` and upper-cases the first character of every segment. Names
/// without underscores only get their first character upper-cased, so
/// already-camel input comes back unchanged. Used for table names, column
/// names and nothing else, so the two always agree.
pub fn to_camel_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
