use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    veille_db::health_check(&pool).await.unwrap();

    let tables = [
        "sites",
        "scan_schedules",
        "scan_schedule_sites",
        "scans",
        "scan_sites",
        "scan_results",
        "journals",
        "social_posts",
        "alerts",
        "false_alerts",
        "reports",
        "report_scans",
        "report_alerts",
        "report_recipients",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
