use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use storefront_migrate::{
    error::StepError,
    inspector::SchemaInspector,
    ledger::LEDGER_TABLE,
    step::{MutationStep, SchemaHandle},
    steps, MigrateError, Runner, StepRegistry,
};

const CREATE_PRODUCTS: &str = "m20240101_000002_create_products";
const ADD_BRAND: &str = "m20240612_000011_add_brand_to_products";
const ADD_REFUNDED: &str = "m20240901_000012_add_refunded_order_status";

/// Single-connection in-memory SQLite so every statement sees the same
/// database for the whole test.
async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(opts)
        .await
        .expect("failed to open in-memory database")
}

fn catalog_subset(versions: &[&str]) -> StepRegistry {
    let subset: Vec<Box<dyn MutationStep>> = steps::all()
        .into_iter()
        .filter(|step| versions.contains(&step.version_id()))
        .collect();
    assert_eq!(subset.len(), versions.len(), "unknown version in subset");
    StepRegistry::new(subset).expect("subset registry")
}

#[tokio::test]
async fn up_applies_everything_then_pending_is_empty() {
    let conn = memory_db().await;
    let runner = Runner::new(conn.clone(), StepRegistry::builtin().expect("registry"));

    let applied = runner.up(None).await.expect("first run");
    assert_eq!(applied, 12);

    let inspector = SchemaInspector::new(&conn);
    for table in [
        "categories",
        "products",
        "product_variants",
        "product_images",
        "users",
        "addresses",
        "locations",
        "orders",
        "order_items",
        "coupons",
    ] {
        assert!(
            inspector.has_table(table).await.expect("has_table"),
            "{table} missing after migration"
        );
    }
    assert!(inspector
        .has_column("products", "brand")
        .await
        .expect("has_column"));

    let status = runner.status().await.expect("status");
    assert_eq!(status.applied.len(), 12);
    assert!(status.pending.is_empty());

    // Rerunning is a no-op thanks to the ledger.
    let reapplied = runner.up(None).await.expect("second run");
    assert_eq!(reapplied, 0);
}

#[tokio::test]
async fn reapplying_steps_leaves_schema_unchanged() {
    let conn = memory_db().await;
    let runner = Runner::new(conn.clone(), StepRegistry::builtin().expect("registry"));
    runner.up(None).await.expect("migrate up");

    let inspector = SchemaInspector::new(&conn);
    let before = inspector.describe("products").await.expect("describe");

    // Run every forward action a second time directly, bypassing the ledger.
    let handle = SchemaHandle::new(&conn);
    for step in steps::all() {
        step.up(&handle)
            .await
            .unwrap_or_else(|e| panic!("{} not idempotent: {e}", step.version_id()));
    }

    let after = inspector.describe("products").await.expect("describe");
    assert_eq!(before, after);
}

#[tokio::test]
async fn steps_apply_in_ascending_order_from_unsorted_registry() {
    struct Recording {
        id: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl MutationStep for Recording {
        fn version_id(&self) -> &str {
            self.id
        }
        fn description(&self) -> &str {
            "recording step"
        }
        async fn up(&self, _schema: &SchemaHandle<'_>) -> Result<(), StepError> {
            self.log.lock().expect("log lock").push(self.id.to_owned());
            Ok(())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let unsorted: Vec<Box<dyn MutationStep>> = vec![
        Box::new(Recording { id: "m20240301_000003_third", log: log.clone() }),
        Box::new(Recording { id: "m20240101_000001_first", log: log.clone() }),
        Box::new(Recording { id: "m20240201_000002_second", log: log.clone() }),
    ];

    let conn = memory_db().await;
    let runner = Runner::new(conn, StepRegistry::new(unsorted).expect("registry"));
    runner.up(None).await.expect("migrate up");

    assert_eq!(
        *log.lock().expect("log lock"),
        [
            "m20240101_000001_first",
            "m20240201_000002_second",
            "m20240301_000003_third"
        ]
    );
}

#[tokio::test]
async fn apply_then_revert_restores_prior_schema() {
    let conn = memory_db().await;
    let base = catalog_subset(&["m20240101_000001_create_categories", CREATE_PRODUCTS]);
    Runner::new(conn.clone(), base).up(None).await.expect("base up");

    let inspector = SchemaInspector::new(&conn);
    let before = inspector.describe("products").await.expect("describe");
    assert!(!before.contains_key("brand"));

    let full = catalog_subset(&[
        "m20240101_000001_create_categories",
        CREATE_PRODUCTS,
        ADD_BRAND,
    ]);
    let runner = Runner::new(conn.clone(), full);
    assert_eq!(runner.up(None).await.expect("brand up"), 1);
    assert!(inspector
        .describe("products")
        .await
        .expect("describe")
        .contains_key("brand"));

    let reverted = runner.down(Some(CREATE_PRODUCTS)).await.expect("brand down");
    assert_eq!(reverted, 1);
    let after = inspector.describe("products").await.expect("describe");
    assert_eq!(before, after);
}

#[tokio::test]
async fn rollback_past_non_revertible_step_reverts_nothing() {
    let conn = memory_db().await;
    let runner = Runner::new(conn.clone(), StepRegistry::builtin().expect("registry"));
    runner.up(None).await.expect("migrate up");

    let err = runner.down(Some(ADD_BRAND)).await.expect_err("must refuse");
    match err {
        MigrateError::NonRevertibleStep { version_id } => {
            assert_eq!(version_id, ADD_REFUNDED);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Nothing was erased and nothing was dropped.
    let status = runner.status().await.expect("status");
    assert_eq!(status.applied.len(), 12);
    assert!(SchemaInspector::new(&conn)
        .has_column("products", "brand")
        .await
        .expect("has_column"));
}

#[tokio::test]
async fn down_without_target_reverts_all_reversible_steps() {
    let conn = memory_db().await;
    let registry = catalog_subset(&[
        "m20240101_000001_create_categories",
        CREATE_PRODUCTS,
        ADD_BRAND,
    ]);
    let runner = Runner::new(conn.clone(), registry);
    runner.up(None).await.expect("migrate up");

    assert_eq!(runner.down(None).await.expect("migrate down"), 3);

    let inspector = SchemaInspector::new(&conn);
    assert!(!inspector.has_table("products").await.expect("has_table"));
    assert!(!inspector.has_table("categories").await.expect("has_table"));

    let status = runner.status().await.expect("status");
    assert!(status.applied.is_empty());
    assert_eq!(status.pending.len(), 3);
}

#[tokio::test]
async fn brand_step_skips_when_column_already_exists() {
    let conn = memory_db().await;
    let registry = catalog_subset(&["m20240101_000001_create_categories", CREATE_PRODUCTS]);
    Runner::new(conn.clone(), registry).up(None).await.expect("base up");

    // A hotfix added the column out of band.
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "ALTER TABLE products ADD COLUMN brand VARCHAR(255)".to_owned(),
    ))
    .await
    .expect("manual alter");

    let registry = catalog_subset(&[
        "m20240101_000001_create_categories",
        CREATE_PRODUCTS,
        ADD_BRAND,
    ]);
    let runner = Runner::new(conn.clone(), registry);
    assert_eq!(runner.up(None).await.expect("brand up"), 1);

    let columns = SchemaInspector::new(&conn)
        .describe("products")
        .await
        .expect("describe");
    assert!(columns.contains_key("brand"));
}

#[tokio::test]
async fn enum_widening_step_succeeds_when_value_already_present() {
    let conn = memory_db().await;
    let runner = Runner::new(conn.clone(), StepRegistry::builtin().expect("registry"));
    runner.up(None).await.expect("migrate up");

    // Re-running the widening step directly must stay a success.
    let handle = SchemaHandle::new(&conn);
    let step = steps::m20240901_000012_add_refunded_order_status::AddRefundedOrderStatus;
    step.up(&handle).await.expect("repeat widen");
    assert!(!step.revertible());
}

#[tokio::test]
async fn ledger_row_without_registered_step_is_surfaced() {
    let conn = memory_db().await;
    let runner = Runner::new(conn.clone(), StepRegistry::builtin().expect("registry"));
    runner.up(None).await.expect("migrate up");

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        format!(
            "INSERT INTO {LEDGER_TABLE} (version_id, applied_at) \
             VALUES ('m20990101_000099_ghost', '2099-01-01T00:00:00+00:00')"
        ),
    ))
    .await
    .expect("insert ghost row");

    let err = match runner.plan().await {
        Ok(_) => panic!("ghost ledger row must surface an error"),
        Err(err) => err,
    };
    match err {
        MigrateError::LedgerInconsistency { version_id } => {
            assert_eq!(version_id, "m20990101_000099_ghost");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn up_with_target_stops_after_that_version() {
    let conn = memory_db().await;
    let runner = Runner::new(conn.clone(), StepRegistry::builtin().expect("registry"));

    let applied = runner
        .up(Some("m20240101_000005_create_users"))
        .await
        .expect("partial up");
    assert_eq!(applied, 5);

    let inspector = SchemaInspector::new(&conn);
    assert!(inspector.has_table("users").await.expect("has_table"));
    assert!(!inspector.has_table("orders").await.expect("has_table"));

    let status = runner.status().await.expect("status");
    assert_eq!(status.applied.len(), 5);
    assert_eq!(status.pending.len(), 7);
}

#[tokio::test]
async fn unknown_target_version_is_rejected() {
    let conn = memory_db().await;
    let runner = Runner::new(conn, StepRegistry::builtin().expect("registry"));

    let err = runner
        .up(Some("m20991231_000099_not_a_step"))
        .await
        .expect_err("must reject");
    assert!(matches!(err, MigrateError::UnknownVersion { .. }));
}

#[tokio::test]
async fn halted_run_keeps_prior_steps_recorded() {
    struct Ok1;
    struct Boom;

    #[async_trait]
    impl MutationStep for Ok1 {
        fn version_id(&self) -> &str {
            "m20240101_000001_ok"
        }
        fn description(&self) -> &str {
            "succeeds"
        }
        async fn up(&self, schema: &SchemaHandle<'_>) -> Result<(), StepError> {
            schema
                .create_table_if_absent("ok_marker", "CREATE TABLE ok_marker (id INTEGER)")
                .await
        }
    }

    #[async_trait]
    impl MutationStep for Boom {
        fn version_id(&self) -> &str {
            "m20240101_000002_boom"
        }
        fn description(&self) -> &str {
            "fails"
        }
        async fn up(&self, _schema: &SchemaHandle<'_>) -> Result<(), StepError> {
            Err(StepError::Failed("deliberate failure".to_owned()))
        }
    }

    let conn = memory_db().await;
    let registry =
        StepRegistry::new(vec![Box::new(Ok1), Box::new(Boom)]).expect("registry");
    let runner = Runner::new(conn.clone(), registry);

    let err = runner.up(None).await.expect_err("must halt");
    match err {
        MigrateError::Step { version_id, .. } => {
            assert_eq!(version_id, "m20240101_000002_boom");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The successful step stays recorded; only the failed one is pending.
    let status = runner.status().await.expect("status");
    assert_eq!(status.applied.len(), 1);
    assert_eq!(status.applied[0].version_id, "m20240101_000001_ok");
    assert_eq!(status.pending.len(), 1);
}
