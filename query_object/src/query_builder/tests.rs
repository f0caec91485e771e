//! Query builder utilities
//!
//! Statement assembly tests.

#[cfg(test)]
mod tests {
    use crate::errors::QueryError;
    use crate::query_builder::{Cursor, Select, Update};
    use crate::table::Table;
    use crate::traits::Tabler;
    use serde_json::json;
    use std::sync::Arc;

    fn emp() -> Arc<dyn Tabler> {
        Arc::new(
            Table::builder("emp")
                .primary_key("id", 1)
                .field("name")
                .field("child")
                .field("joindate")
                .build()
                .unwrap(),
        )
    }

    fn trade() -> Arc<dyn Tabler> {
        Arc::new(
            Table::builder("trade")
                .primary_key("seq", 2)
                .primary_key("symbol", 1)
                .field("price")
                .build()
                .unwrap(),
        )
    }

    // ========================================
    // SELECT assembly
    // ========================================

    #[test]
    fn test_select_star_and_explicit() {
        let (sql, args) = Select::new(emp(), false).query();
        assert_eq!(sql, "SELECT * FROM emp ORDER BY id");
        assert!(args.is_empty());

        let (sql, _) = Select::new(emp(), true).query();
        assert_eq!(sql, "SELECT id,name,child,joindate FROM emp ORDER BY id");
    }

    #[test]
    fn test_select_full_statement() {
        let select = Select::new(emp(), false)
            .with_fields(["Name", "child"])
            .with_filter("child", ">=", 1)
            .with_filter("JoinDate", "<", "2016-01-05")
            .with_order_by(["name"])
            .with_limit(10)
            .with_offset(20);

        let (sql, args) = select.checked_query().unwrap();
        assert_eq!(
            sql,
            "SELECT name,child FROM emp WHERE child >= $1 AND joindate < $2 \
             ORDER BY name,id LIMIT 10 OFFSET 20"
        );
        assert_eq!(args, vec![json!(1), json!("2016-01-05")]);
    }

    #[test]
    fn test_order_by_appends_missing_keys_once() {
        let (sql, _) = Select::new(trade(), false)
            .with_order_by(["price", "seq"])
            .query();
        assert_eq!(sql, "SELECT * FROM trade ORDER BY price,seq,symbol");
    }

    #[test]
    fn test_zero_limit_and_offset_are_omitted() {
        let (sql, _) = Select::new(emp(), false).with_limit(0).with_offset(0).query();
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
    }

    #[test]
    fn test_range_adds_two_arguments() {
        let (sql, args) = Select::new(emp(), false).with_range("child", 1, 3).query();
        assert_eq!(
            sql,
            "SELECT * FROM emp WHERE child >= $1 AND child <= $2 ORDER BY id"
        );
        assert_eq!(args, vec![json!(1), json!(3)]);
    }

    #[test]
    fn test_select_by_pk_uses_rank_order() {
        let select = Select::new(trade(), false).with_filter("price", ">", 10);
        assert_eq!(
            select.select_by_pk(),
            "SELECT * FROM trade WHERE symbol = $1 AND seq = $2"
        );
    }

    #[test]
    fn test_select_all_ignores_filters_and_paging() {
        let select = Select::new(emp(), true)
            .with_filter("child", "=", 2)
            .with_limit(5);
        assert_eq!(
            select.select_all(),
            "SELECT id,name,child,joindate FROM emp ORDER BY id"
        );
    }

    #[test]
    fn test_row_number_query_carries_filters() {
        let select = Select::new(emp(), false).with_filter("child", ">=", 1);
        let (sql, args) = select.row_number_query(&[json!("e5")]);
        assert_eq!(
            sql,
            "SELECT row_number FROM (SELECT id, row_number() OVER (ORDER BY id) FROM emp \
             WHERE child >= $1) AS ranked WHERE id = $2"
        );
        assert_eq!(args, vec![json!(1), json!("e5")]);
    }

    #[test]
    fn test_count_query() {
        let (sql, args) = Select::new(emp(), false).count_query();
        assert_eq!(sql, "SELECT count(*) FROM emp");
        assert!(args.is_empty());

        let (sql, _) = Select::new(emp(), false)
            .with_filter("name", "=", "al")
            .count_query();
        assert_eq!(sql, "SELECT count(*) FROM emp WHERE name = $1");
    }

    #[test]
    fn test_validate_rejects_unknown_names() {
        let cases = [
            Select::new(emp(), false).with_fields(["salary"]),
            Select::new(emp(), false).with_filter("salary", "=", 1),
            Select::new(emp(), false).with_order_by(["salary"]),
        ];
        for select in cases {
            match select.validate() {
                Err(QueryError::UnknownField { table, field }) => {
                    assert_eq!(table, "emp");
                    assert_eq!(field, "salary");
                }
                other => panic!("Expected UnknownField, got {:?}", other),
            }
        }

        let select = Select::new(emp(), false).with_filter("child", "!=", 1);
        assert!(matches!(
            select.checked_query(),
            Err(QueryError::UnsupportedOperator(op)) if op == "!="
        ));
    }

    #[test]
    fn test_reset_returns_to_pristine() {
        let mut select = Select::new(emp(), false)
            .with_fields(["name"])
            .with_filter("child", "=", 1)
            .with_order_by(["name"])
            .with_limit(2)
            .with_offset(4);
        assert!(select.cursor().is_some());

        select.reset();
        assert_eq!(select.query().0, "SELECT * FROM emp ORDER BY id");
        assert!(select.cursor().is_none());
    }

    // ========================================
    // Cursor stepping
    // ========================================

    #[test]
    fn test_cursor_restores_state() {
        let select = Select::new(emp(), false)
            .with_fields(["name"])
            .with_filter("name", ">=", "a,b;c")
            .with_order_by(["name"])
            .with_limit(3)
            .with_offset(6);
        let cursor = select.cursor().unwrap().to_string();

        let mut restored = Select::new(emp(), false);
        restored.advance(&cursor).unwrap();
        restored.retreat(&restored.cursor().unwrap().to_string()).unwrap();

        assert_eq!(restored.query(), select.query());
    }

    #[test]
    fn test_advance_then_retreat_is_symmetric() {
        let mut select = Select::new(emp(), false).with_limit(2).with_offset(4);

        let start = select.cursor().unwrap().to_string();
        select.advance(&start).unwrap();
        assert_eq!(select.offset(), 6);

        let next = select.cursor().unwrap().to_string();
        select.retreat(&next).unwrap();
        assert_eq!(select.offset(), 4);
    }

    #[test]
    fn test_retreat_before_first_page() {
        let mut select = Select::new(emp(), false).with_limit(2);
        let first = select.cursor().unwrap().to_string();

        match select.retreat(&first) {
            Err(QueryError::OutOfRange { offset, limit }) => {
                assert_eq!(offset, 0);
                assert_eq!(limit, 2);
            }
            other => panic!("Expected OutOfRange, got {:?}", other),
        }
        assert_eq!(select.offset(), 0);

        // A partial page back lands on the first page
        let mut select = Select::new(emp(), false).with_limit(5).with_offset(3);
        let cursor = select.cursor().unwrap().to_string();
        select.retreat(&cursor).unwrap();
        assert_eq!(select.offset(), 0);
    }

    #[test]
    fn test_malformed_cursor_leaves_state() {
        let mut select = Select::new(emp(), false).with_limit(2).with_offset(4);

        assert!(matches!(
            select.advance("%%%"),
            Err(QueryError::MalformedCursor(_))
        ));
        assert!(matches!(
            select.retreat("W10"),
            Err(QueryError::MalformedCursor(_))
        ));
        assert_eq!(select.offset(), 4);
        assert_eq!(select.limit(), 2);
    }

    #[test]
    fn test_empty_cursor_lists_keep_current_state() {
        let mut select = Select::new(emp(), false)
            .with_fields(["name"])
            .with_filter("child", "=", 1);

        let bare = Cursor {
            limit: 2,
            offset: 2,
            ..Cursor::default()
        };
        select.advance(&bare.to_string()).unwrap();

        assert_eq!(select.fields(), ["name"]);
        assert_eq!(select.filters().len(), 1);
        assert_eq!(select.offset(), 4);
    }

    // ========================================
    // UPDATE / INSERT / DELETE assembly
    // ========================================

    #[test]
    fn test_update_query_then_reset() {
        let mut update = Update::new(emp());
        update.set("name", "bo").unwrap();
        update.set_filter("id", "=", "e1");

        let (sql, args) = update.query();
        assert_eq!(sql, "UPDATE emp SET name = $1 WHERE id = $2");
        assert_eq!(args, vec![json!("bo"), json!("e1")]);

        // State was reset
        assert_eq!(update.query(), (String::new(), vec![]));
    }

    #[test]
    fn test_update_set_rules() {
        let mut update = Update::new(emp());

        assert!(matches!(
            update.set("id", "x"),
            Err(QueryError::PrimaryKeyUpdate(field)) if field == "id"
        ));
        assert!(matches!(
            update.set("salary", 1),
            Err(QueryError::UnknownField { .. })
        ));

        update.set("Name", "al").unwrap();
        update.set("child", 2).unwrap();
        update.set("name", "bo").unwrap();

        let (sql, args) = update.update_by_pk_query();
        assert_eq!(sql, "UPDATE emp SET name = $1, child = $2 WHERE id = $3");
        assert_eq!(args, vec![json!("bo"), json!(2)]);
    }

    #[test]
    fn test_insert_query_and_args() {
        #[derive(serde::Serialize)]
        struct NewEmp {
            name: String,
            id: String,
            joindate: String,
            child: i32,
        }

        let update = Update::new(emp());
        assert_eq!(
            update.insert_query(),
            "INSERT INTO emp (id,name,child,joindate) VALUES ($1,$2,$3,$4)"
        );

        let args = update
            .insert_args(&NewEmp {
                name: "al".into(),
                id: "e1".into(),
                joindate: "2016-01-01T00:00:00Z".into(),
                child: 2,
            })
            .unwrap();
        assert_eq!(
            args,
            vec![json!("e1"), json!("al"), json!(2), json!("2016-01-01T00:00:00Z")]
        );

        #[derive(serde::Serialize)]
        struct Partial {
            id: String,
        }
        assert!(matches!(
            update.insert_args(&Partial { id: "e1".into() }),
            Err(QueryError::InsufficientFields { required: 4, available: 1 })
        ));
    }

    #[test]
    fn test_delete_queries() {
        let mut update = Update::new(trade());
        assert_eq!(
            update.delete_by_pk_query(),
            "DELETE FROM trade WHERE symbol = $1 AND seq = $2"
        );

        assert_eq!(update.delete_query().0, "DELETE FROM trade");

        update.set_filter("price", "<", 1.5);
        let (sql, args) = update.delete_query();
        assert_eq!(sql, "DELETE FROM trade WHERE price < $1");
        assert_eq!(args, vec![json!(1.5)]);
    }
}
