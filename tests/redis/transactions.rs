use std::time::Duration;

use redis_kv::{commands::CommandHandler, resp::RespValue};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_transaction_replays_queued_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client(&TestUtils::client_address(50001));

    assert_eq!(client.dispatch(TestUtils::command(&["MULTI"])).await, TestUtils::ok());
    assert_eq!(
        client.dispatch(TestUtils::command(&["INCR", "1"])).await,
        TestUtils::queued()
    );
    assert_eq!(
        client.dispatch(TestUtils::command(&["INCR", "2"])).await,
        TestUtils::queued()
    );
    assert_eq!(
        client.dispatch(TestUtils::command(&["INCR", "2"])).await,
        TestUtils::queued()
    );

    // Nothing runs before EXEC.
    env.exec_command_expect(
        TestUtils::get_command("2"),
        &TestUtils::client_address(50002),
        RespValue::NullBulkString,
    )
    .await;

    assert_eq!(
        client.dispatch(TestUtils::command(&["EXEC"])).await,
        RespValue::Array(vec![
            TestUtils::expected_integer(1),
            TestUtils::expected_integer(1),
            TestUtils::expected_integer(2),
        ])
    );

    assert_eq!(
        client.dispatch(TestUtils::get_command("2")).await,
        TestUtils::expected_bulk_string("2")
    );
}

#[tokio::test]
async fn test_failing_command_does_not_abort_the_transaction() {
    let env = TestEnv::new_master_server();
    let mut client = env.client(&TestUtils::client_address(50003));

    let requests = vec![
        TestUtils::command(&["MULTI"]),
        TestUtils::set_command("fruit", "apple"),
        TestUtils::command(&["INCR", "fruit"]),
        TestUtils::command(&["LPUSH", "fruit"]),
        TestUtils::set_command("counter", "9"),
        TestUtils::command(&["INCR", "counter"]),
    ];

    for request in requests {
        client.dispatch(request).await;
    }

    assert_eq!(
        client.dispatch(TestUtils::command(&["EXEC"])).await,
        RespValue::Array(vec![
            TestUtils::ok(),
            TestUtils::expected_error("ERR value is not an integer or out of range"),
            TestUtils::expected_error("ERR wrong number of arguments for 'lpush' command"),
            TestUtils::ok(),
            TestUtils::expected_integer(10),
        ])
    );
}

#[tokio::test]
async fn test_transaction_errors() {
    let env = TestEnv::new_master_server();
    let mut client = env.client(&TestUtils::client_address(50004));

    let test_cases = vec![
        (
            TestUtils::command(&["EXEC"]),
            TestUtils::expected_error("ERR EXEC without MULTI"),
        ),
        (
            TestUtils::command(&["DISCARD"]),
            TestUtils::expected_error("ERR DISCARD without MULTI"),
        ),
        (TestUtils::command(&["MULTI"]), TestUtils::ok()),
        (
            TestUtils::command(&["MULTI"]),
            TestUtils::expected_error("ERR MULTI calls can not be nested"),
        ),
        (TestUtils::command(&["EXEC"]), RespValue::Array(vec![])),
    ];

    for (command, expected) in test_cases {
        assert_eq!(client.dispatch(command).await, expected);
    }
}

#[tokio::test]
async fn test_discard_drops_queued_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client(&TestUtils::client_address(50005));

    client.dispatch(TestUtils::command(&["MULTI"])).await;
    client.dispatch(TestUtils::set_command("fruit", "apple")).await;

    assert_eq!(
        client.queued_commands(),
        &[CommandHandler {
            name: "SET".to_string(),
            arguments: vec!["fruit".to_string(), "apple".to_string()],
        }]
    );

    assert_eq!(client.dispatch(TestUtils::command(&["DISCARD"])).await, TestUtils::ok());
    assert!(!client.in_transaction());

    assert_eq!(
        client.dispatch(TestUtils::get_command("fruit")).await,
        RespValue::NullBulkString
    );
    assert_eq!(
        client.dispatch(TestUtils::command(&["EXEC"])).await,
        TestUtils::expected_error("ERR EXEC without MULTI")
    );
}

#[tokio::test]
async fn test_transactions_are_per_client() {
    let env = TestEnv::new_master_server();
    let mut first = env.client(&TestUtils::client_address(50006));
    let mut second = env.client(&TestUtils::client_address(50007));

    first.dispatch(TestUtils::command(&["MULTI"])).await;
    first.dispatch(TestUtils::set_command("fruit", "apple")).await;

    assert_eq!(
        second.dispatch(TestUtils::set_command("fruit", "kiwi")).await,
        TestUtils::ok()
    );
    assert_eq!(
        second.dispatch(TestUtils::command(&["EXEC"])).await,
        TestUtils::expected_error("ERR EXEC without MULTI")
    );

    first.dispatch(TestUtils::command(&["EXEC"])).await;

    assert_eq!(
        second.dispatch(TestUtils::get_command("fruit")).await,
        TestUtils::expected_bulk_string("apple")
    );
}

#[tokio::test]
async fn test_blocking_commands_do_not_block_inside_exec() {
    let env = TestEnv::new_master_server();
    let mut client = env.client(&TestUtils::client_address(50008));

    client.dispatch(TestUtils::command(&["MULTI"])).await;
    client.dispatch(TestUtils::blpop_command(&["queue"], "0")).await;
    client
        .dispatch(TestUtils::xread_blocking_command("0", &["sensor"], &["$"]))
        .await;
    client.dispatch(TestUtils::lpush_command("queue", &["job"])).await;
    client.dispatch(TestUtils::blpop_command(&["queue"], "0")).await;

    let response = tokio::time::timeout(
        Duration::from_secs(1),
        client.dispatch(TestUtils::command(&["EXEC"])),
    )
    .await
    .expect("EXEC must not block");

    assert_eq!(
        response,
        RespValue::Array(vec![
            RespValue::NullArray,
            RespValue::NullArray,
            TestUtils::expected_integer(1),
            TestUtils::expected_bulk_string_array(&["queue", "job"]),
        ])
    );
}
