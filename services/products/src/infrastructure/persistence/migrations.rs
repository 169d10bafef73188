//! Schema migrations, applied in version order at start-up

use catalog_adapter_postgres::Migration;

pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(
        1,
        "create_products",
        include_str!("../../../migrations/0001_create_products.sql"),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_unique_and_ascending() {
        let versions: Vec<i64> = migrations().iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_products_table_is_created() {
        let first = &migrations()[0];
        assert!(first.up_sql.contains("CREATE TABLE IF NOT EXISTS products"));
    }
}
