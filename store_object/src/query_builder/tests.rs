use crate::errors::{QueryError, StoreError};
use crate::query_builder::{
    FilterClause, JoinSpec, JoinType, OperatorKind, OrderSpec, PaginationRequest, QueryBuilder,
    QueryOptions, RawFilterClause, RawQueryOptions, SqlGenerator,
};
use crate::traits::backing_store::{CountRequest, RowRange, SelectRequest};
use config::UnknownOperatorPolicy;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts WARN events
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, warnings.load(Ordering::SeqCst))
}

fn select(table: &str, options: &QueryOptions) -> SelectRequest {
    QueryBuilder::new(table).build(options)
}

// ========================================
// Operators
// ========================================

#[test]
fn test_operator_names_roundtrip() {
    for op in OperatorKind::ALL {
        assert_eq!(op.as_str().parse::<OperatorKind>(), Ok(op));
    }
    assert!("contains".parse::<OperatorKind>().is_err());
    assert!("EQ".parse::<OperatorKind>().is_err());
}

#[test]
fn test_unknown_operator_is_dropped_with_one_warning() {
    let raw = RawQueryOptions {
        filters: vec![
            RawFilterClause::new("title", "contains", json!("rust")),
            RawFilterClause::new("price", "gt", json!(10)),
        ],
        ..Default::default()
    };

    let (resolved, warnings) = count_warnings(|| raw.resolve(UnknownOperatorPolicy::Drop));
    let options = resolved.unwrap();

    assert_eq!(warnings, 1);
    assert_eq!(options.filters, vec![FilterClause::gt("price", json!(10))]);
}

#[test]
fn test_each_unknown_operator_warns_once() {
    let raw = RawQueryOptions {
        filters: vec![
            RawFilterClause::new("title", "contains", json!("a")),
            RawFilterClause::new("title", "contains", json!("b")),
            RawFilterClause::new("tags", "overlaps", json!(["x"])),
        ],
        ..Default::default()
    };

    let (resolved, warnings) = count_warnings(|| raw.resolve(UnknownOperatorPolicy::Drop));
    assert!(resolved.unwrap().filters.is_empty());
    assert_eq!(warnings, 3);
}

#[test]
fn test_unknown_operator_rejected_under_reject_policy() {
    let raw = RawQueryOptions {
        filters: vec![RawFilterClause::new("title", "contains", json!("rust"))],
        ..Default::default()
    };

    let (resolved, warnings) = count_warnings(|| raw.resolve(UnknownOperatorPolicy::Reject));
    assert_eq!(warnings, 0);
    match resolved {
        Err(QueryError::UnknownOperator { column, operator }) => {
            assert_eq!(column, "title");
            assert_eq!(operator, "contains");
        }
        other => panic!("expected UnknownOperator, got {:?}", other),
    }
}

#[test]
fn test_raw_options_deserialize() {
    let raw: RawQueryOptions = serde_json::from_str(
        r#"{"projection":"id,title","filters":[{"column":"published","operator":"is","value":true}],
            "orderBy":[{"column":"created_at","ascending":false},{"column":"id"}],"limit":5}"#,
    )
    .unwrap();
    let options = raw.resolve(UnknownOperatorPolicy::Drop).unwrap();

    assert_eq!(options.projection.as_deref(), Some("id,title"));
    assert_eq!(options.filters[0].operator, OperatorKind::Is);
    assert_eq!(
        options.order_by,
        vec![OrderSpec::desc("created_at"), OrderSpec::asc("id")]
    );
    assert_eq!(options.limit, Some(5));
}

// ========================================
// Canonical cache keys
// ========================================

#[test]
fn test_cache_key_ignores_filter_order() {
    let a = QueryOptions::new()
        .filter(FilterClause::eq("status", json!("active")))
        .filter(FilterClause::gte("price", json!(10)));
    let b = QueryOptions::new()
        .filter(FilterClause::gte("price", json!(10)))
        .filter(FilterClause::eq("status", json!("active")));

    assert_eq!(a.cache_key("packages"), b.cache_key("packages"));
}

#[test]
fn test_cache_key_ignores_object_key_order_in_json_input() {
    let a: QueryOptions = serde_json::from_str(
        r#"{"limit":2,"filters":[{"value":{"b":1,"a":2},"operator":"eq","column":"meta"}]}"#,
    )
    .unwrap();
    let b: QueryOptions = serde_json::from_str(
        r#"{"filters":[{"column":"meta","operator":"eq","value":{"a":2,"b":1}}],"limit":2}"#,
    )
    .unwrap();

    assert_eq!(a.cache_key("packages"), b.cache_key("packages"));
}

#[test]
fn test_cache_key_ignores_in_list_order() {
    let a = QueryOptions::new().filter(FilterClause::in_values("id", vec![json!(1), json!(2)]));
    let b = QueryOptions::new().filter(FilterClause::in_values("id", vec![json!(2), json!(1)]));

    assert_eq!(a.cache_key("courses"), b.cache_key("courses"));
}

#[test]
fn test_cache_key_respects_order_by_order() {
    let a = QueryOptions::new()
        .order_by(OrderSpec::asc("title"))
        .order_by(OrderSpec::desc("price"));
    let b = QueryOptions::new()
        .order_by(OrderSpec::desc("price"))
        .order_by(OrderSpec::asc("title"));

    assert_ne!(a.cache_key("courses"), b.cache_key("courses"));
}

#[test]
fn test_cache_key_distinguishes_tables_and_content() {
    let options = QueryOptions::new().limit(2);

    assert_ne!(options.cache_key("courses"), options.cache_key("packages"));
    assert_ne!(options.cache_key("courses"), QueryOptions::new().limit(3).cache_key("courses"));
    assert!(options.cache_key("courses").starts_with("courses:query:"));
}

#[test]
fn test_default_projection_is_star_for_keying() {
    assert_eq!(
        QueryOptions::new().cache_key("courses"),
        QueryOptions::new().select("*").cache_key("courses")
    );
}

#[test]
fn test_count_key_depends_on_filters_only() {
    let base = QueryOptions::new().filter(FilterClause::eq("level", json!("beginner")));
    let page_two = base.clone().limit(20).offset(20).order_by(OrderSpec::asc("id"));

    assert_eq!(base.count_key_base("courses"), page_two.count_key_base("courses"));
    assert_ne!(
        base.count_key_base("courses"),
        QueryOptions::new().count_key_base("courses")
    );
}

// ========================================
// Builder
// ========================================

#[test]
fn test_builder_defaults() {
    let request = select("packages", &QueryOptions::new());

    assert_eq!(request.table, "packages");
    assert_eq!(request.projection, "*");
    assert!(request.filters.is_empty());
    assert_eq!(request.range, None);
}

#[test]
fn test_builder_limit_only() {
    let request = select("packages", &QueryOptions::new().limit(2));
    assert_eq!(request.range, Some(RowRange::new(0, 1)));
}

#[test]
fn test_builder_offset_and_limit() {
    let request = select("packages", &QueryOptions::new().offset(40).limit(20));
    assert_eq!(request.range, Some(RowRange::new(40, 59)));
    assert_eq!(request.range.unwrap().limit(), 20);
}

#[test]
fn test_builder_offset_without_limit_uses_window() {
    let request = select("packages", &QueryOptions::new().offset(5));
    assert_eq!(request.range, Some(RowRange::new(5, 14)));

    let request = QueryBuilder::new("packages")
        .with_window_size(3)
        .build(&QueryOptions::new().offset(5));
    assert_eq!(request.range, Some(RowRange::new(5, 7)));
}

#[test]
fn test_builder_window_clipped_at_max_offset() {
    let request = select("packages", &QueryOptions::new().offset(i64::MAX).limit(5));
    assert_eq!(request.range, Some(RowRange::new(i64::MAX, i64::MAX)));
    assert_eq!(request.range.unwrap().limit(), 1);

    let request = select("packages", &QueryOptions::new().offset(i64::MAX - 1));
    assert_eq!(request.range, Some(RowRange::new(i64::MAX - 1, i64::MAX)));

    assert_eq!(RowRange::new(0, i64::MAX).limit(), i64::MAX);
    assert_eq!(RowRange::new(i64::MIN, i64::MAX).limit(), i64::MAX);
}

// ========================================
// Pagination
// ========================================

#[test]
fn test_pagination_offset() {
    let request = PaginationRequest::new(3, 20);
    assert!(request.validate().is_ok());
    assert_eq!(request.offset(), 40);
    assert_eq!(PaginationRequest::new(1, 20).offset(), 0);
}

#[test]
fn test_pagination_overflowing_offset_is_rejected() {
    let request = PaginationRequest::new(i64::MAX / 2, 4);
    assert!(matches!(request.validate(), Err(QueryError::InvalidPagination(_))));
    assert_eq!(request.offset(), i64::MAX);

    let request = PaginationRequest::new(i64::MAX, i64::MAX);
    assert!(matches!(request.validate(), Err(QueryError::InvalidPagination(_))));

    // The last page whose offset still fits
    let request = PaginationRequest::new(i64::MAX / 4 + 1, 4);
    assert!(request.validate().is_ok());
    assert_eq!(request.offset(), i64::MAX / 4 * 4);
}

#[test]
fn test_builder_keeps_order_and_filter_sequence() {
    let options = QueryOptions::new()
        .filter(FilterClause::eq("a", json!(1)))
        .filter(FilterClause::eq("b", json!(2)))
        .order_by(OrderSpec::desc("created_at"))
        .order_by(OrderSpec::asc("id"));
    let request = select("courses", &options);

    assert_eq!(request.filters, options.filters);
    assert_eq!(request.order_by[0], OrderSpec::desc("created_at"));
    assert_eq!(request.order_by[1], OrderSpec::asc("id"));
}

// ========================================
// SQL generation
// ========================================

#[test]
fn test_select_sql_full() {
    let options = QueryOptions::new()
        .select("id, title")
        .filter(FilterClause::eq("status", json!("published")))
        .filter(FilterClause::ilike("title", "%rust%"))
        .order_by(OrderSpec::desc("created_at"))
        .offset(20)
        .limit(10);
    let statement = SqlGenerator::select(&select("courses", &options)).unwrap();

    assert_eq!(
        statement.sql,
        "SELECT row_to_json(t) FROM (SELECT id, title FROM courses \
         WHERE status = $1 AND title ILIKE $2 ORDER BY created_at DESC LIMIT 10 OFFSET 20) t"
    );
    assert_eq!(statement.params, vec![json!("published"), json!("%rust%")]);
}

#[test]
fn test_select_sql_star() {
    let statement = SqlGenerator::select(&select("packages", &QueryOptions::new().limit(2))).unwrap();
    assert_eq!(
        statement.sql,
        "SELECT row_to_json(t) FROM (SELECT packages.* FROM packages LIMIT 2) t"
    );
    assert!(statement.params.is_empty());
}

#[test]
fn test_null_and_is_filters() {
    let options = QueryOptions::new()
        .filter(FilterClause::eq("deleted_at", json!(null)))
        .filter(FilterClause::neq("mentor_id", json!(null)))
        .filter(FilterClause::new("active", OperatorKind::Is, json!(true)))
        .filter(FilterClause::new("archived", OperatorKind::Is, json!("false")));
    let statement = SqlGenerator::select(&select("courses", &options)).unwrap();

    assert!(statement.sql.contains(
        "WHERE deleted_at IS NULL AND mentor_id IS NOT NULL AND active IS TRUE AND archived IS FALSE"
    ));
    assert!(statement.params.is_empty());
}

#[test]
fn test_in_filter_expands_placeholders() {
    let options = QueryOptions::new()
        .filter(FilterClause::eq("level", json!("advanced")))
        .filter(FilterClause::in_values("id", vec![json!(3), json!(5), json!(8)]));
    let statement = SqlGenerator::select(&select("courses", &options)).unwrap();

    assert!(statement.sql.contains("level = $1 AND id IN ($2, $3, $4)"));
    assert_eq!(statement.params.len(), 4);
}

#[test]
fn test_empty_in_filter_matches_nothing() {
    let options = QueryOptions::new().filter(FilterClause::in_values("id", vec![]));
    let statement = SqlGenerator::select(&select("courses", &options)).unwrap();
    assert!(statement.sql.contains("WHERE FALSE"));
}

#[test]
fn test_invalid_filters_are_rejected() {
    let cases = vec![
        FilterClause::gt("price", json!(null)),
        FilterClause::new("title", OperatorKind::Like, json!(5)),
        FilterClause::new("id", OperatorKind::In, json!(5)),
        FilterClause::new("active", OperatorKind::Is, json!(1)),
    ];

    for clause in cases {
        let options = QueryOptions::new().filter(clause);
        assert!(matches!(
            SqlGenerator::select(&select("courses", &options)),
            Err(StoreError::InvalidFilter { .. })
        ));
    }
}

#[test]
fn test_identifiers_are_validated() {
    let bad_table = SqlGenerator::select(&select("courses; DROP TABLE x", &QueryOptions::new()));
    assert!(matches!(bad_table, Err(StoreError::InvalidIdentifier(_))));

    let bad_column = QueryOptions::new().filter(FilterClause::eq("id = 1 OR 1", json!(1)));
    assert!(matches!(
        SqlGenerator::select(&select("courses", &bad_column)),
        Err(StoreError::InvalidIdentifier(_))
    ));

    let bad_order = QueryOptions::new().order_by(OrderSpec::asc("id desc"));
    assert!(matches!(
        SqlGenerator::select(&select("courses", &bad_order)),
        Err(StoreError::InvalidIdentifier(_))
    ));
}

#[test]
fn test_aggregate_projection_sql() {
    let options = QueryOptions::new().select("count(*), sum(price), avg(orders.total)");
    let statement = SqlGenerator::select(&select("orders", &options)).unwrap();

    assert!(statement.sql.contains(
        "SELECT COUNT(*) AS count, SUM(price) AS sum_price, AVG(orders.total) AS avg_orders_total FROM orders"
    ));
}

#[test]
fn test_embedded_left_join_sql() {
    let options = QueryOptions::new()
        .select("*, courses(id,title)")
        .joins(vec![JoinSpec::new("courses", "courses.id = enrollments.course_id")]);
    let statement = SqlGenerator::select(&select("enrollments", &options)).unwrap();

    assert_eq!(
        statement.sql,
        "SELECT row_to_json(t) FROM (SELECT enrollments.*, \
         (SELECT COALESCE(json_agg(j), '[]'::json) FROM (SELECT id, title FROM courses \
         WHERE courses.id = enrollments.course_id) j) AS courses FROM enrollments) t"
    );
}

#[test]
fn test_embedded_inner_join_adds_exists() {
    let options = QueryOptions::new()
        .select("*, users(*)")
        .filter(FilterClause::eq("status", json!("active")))
        .joins(vec![JoinSpec::new("users", "users.id = enrollments.user_id")
            .with_join_type(JoinType::Inner)]);
    let statement = SqlGenerator::select(&select("enrollments", &options)).unwrap();

    assert!(statement.sql.contains(
        "WHERE status = $1 AND EXISTS (SELECT 1 FROM users WHERE users.id = enrollments.user_id)"
    ));
}

#[test]
fn test_embedded_without_join_or_right_join_is_unsupported() {
    let missing = QueryOptions::new().select("*, courses(*)");
    assert!(matches!(
        SqlGenerator::select(&select("enrollments", &missing)),
        Err(StoreError::UnsupportedProjection(_))
    ));

    let right = QueryOptions::new()
        .select("*, courses(*)")
        .joins(vec![JoinSpec::new("courses", "courses.id = enrollments.course_id")
            .with_join_type(JoinType::Right)]);
    assert!(matches!(
        SqlGenerator::select(&select("enrollments", &right)),
        Err(StoreError::UnsupportedProjection(_))
    ));
}

#[test]
fn test_count_sql() {
    let request = CountRequest {
        table: "courses".to_string(),
        filters: vec![FilterClause::eq("level", json!("beginner"))],
    };
    let statement = SqlGenerator::count(&request).unwrap();

    assert_eq!(statement.sql, "SELECT COUNT(*) FROM courses WHERE level = $1");
    assert_eq!(statement.params, vec![json!("beginner")]);

    let all = SqlGenerator::count(&CountRequest {
        table: "courses".to_string(),
        filters: vec![],
    })
    .unwrap();
    assert_eq!(all.sql, "SELECT COUNT(*) FROM courses");
}
