//! End-to-end tests running the executors against fake clients through a real shell

mod common;

use common::{TestContext, ECHO_ARGS};
use spark_executor::spark::{ExecuteRequest, LoadData, SparkExecutor, SparkSqlExecutor, Variables};
use spark_executor::SparkError;

fn vars(pairs: &[(&str, &str)]) -> Variables {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_sql_arguments_reach_client() {
    let ctx = TestContext::new().unwrap();
    let client = ctx.fake_client("spark-sql", ECHO_ARGS).unwrap();

    let executor = SparkSqlExecutor::builder(client.to_string_lossy())
        .variables(vars(&[("spark.executor.memory", "2G"), ("custom.property", "x")]))
        .init_settings(vec!["set a = 1".to_string()])
        .build()
        .unwrap();

    let result = executor
        .execute(&ExecuteRequest::sql("select \"$HOME\""))
        .await
        .unwrap();

    assert_eq!(result.status(), 0);
    let args: Vec<&str> = result.stdout().lines().collect();
    assert_eq!(
        args,
        vec![
            "--conf",
            "custom.property=x",
            "--executor-memory",
            "2G",
            "-e",
            "set a = 1;select \"$HOME\"",
        ]
    );
}

#[tokio::test]
async fn test_output_file_redirect() {
    let ctx = TestContext::new().unwrap();
    let client = ctx.fake_client("spark-sql", "echo \"row-1\"").unwrap();
    let output = ctx.path().join("result.txt");

    let executor = SparkSqlExecutor::builder(client.to_string_lossy())
        .build()
        .unwrap();
    let result = executor
        .execute(&ExecuteRequest::sql("select 1").with_output_file(&output))
        .await
        .unwrap();

    assert!(result.success());
    assert!(result.stdout().is_empty());
    assert_eq!(std::fs::read_to_string(output).unwrap(), "row-1\n");
}

#[tokio::test]
async fn test_log_file_redirect_with_sql_file() {
    let ctx = TestContext::new().unwrap();
    let client = ctx
        .fake_client("spark-submit", "echo \"starting $2\" 1>&2")
        .unwrap();
    let sql_file = ctx.write_file("job.sql", "select 1;").unwrap();
    let log = ctx.path().join("spark.log");

    let executor = SparkExecutor::builder(client.to_string_lossy())
        .variables(Variables::new())
        .build()
        .unwrap();
    let result = executor
        .execute(&ExecuteRequest::sql_file(&sql_file).with_log_file(&log))
        .await
        .unwrap();

    assert!(result.success());
    assert!(result.stderr().is_empty());
    assert_eq!(
        std::fs::read_to_string(log).unwrap(),
        format!("starting {}\n", sql_file.display())
    );
}

#[tokio::test]
async fn test_non_zero_status_is_returned() {
    let ctx = TestContext::new().unwrap();
    let client = ctx
        .fake_client("spark-submit", "echo 'Exception in thread main' 1>&2\nexit 4")
        .unwrap();

    let executor = SparkExecutor::new(client.to_string_lossy()).unwrap();
    let result = executor
        .execute(&ExecuteRequest::sql("select 1"))
        .await
        .unwrap();

    assert_eq!(result.status(), 4);
    assert_eq!(result.stderr(), "Exception in thread main\n");
}

#[tokio::test]
async fn test_load_data_round_trip() {
    let ctx = TestContext::new().unwrap();
    let ok_client = ctx.fake_client("spark-sql-ok", ECHO_ARGS).unwrap();
    let failing_client = ctx
        .fake_client(
            "spark-sql-failing",
            "echo \"Error in query: Table not found\" 1>&2\nexit 1",
        )
        .unwrap();
    let load = LoadData::new("/data/in", "db", "tbl").partition("dt", "20160501");

    let executor = SparkSqlExecutor::new(ok_client.to_string_lossy()).unwrap();
    assert!(executor.load_data(&load).await.unwrap());

    let executor = SparkSqlExecutor::new(failing_client.to_string_lossy()).unwrap();
    let err = executor.load_data(&load).await.unwrap_err();
    assert!(err.is_command_failure());
    assert_eq!(err.stderr(), Some("Error in query: Table not found\n"));
}

#[test]
fn test_client_must_resolve() {
    let ctx = TestContext::new().unwrap();
    let missing = ctx.path().join("spark-sql");

    let err = SparkSqlExecutor::new(missing.to_string_lossy()).unwrap_err();
    assert!(matches!(err, SparkError::SparkSqlUnfound(_)));

    let err = SparkExecutor::new("").unwrap_err();
    assert!(matches!(err, SparkError::MissingArgument(_)));
}
