use redis_kv::resp::RespValue;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_ping_command() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        (
            TestUtils::command(&["PING"]),
            RespValue::SimpleString("PONG".to_string()),
        ),
        (
            TestUtils::command(&["ping", "hello"]),
            TestUtils::expected_bulk_string("hello"),
        ),
        (
            TestUtils::command(&["PING", "a", "b"]),
            TestUtils::expected_error("ERR wrong number of arguments for 'ping' command"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_expect(command, &TestUtils::client_address(41001), expected)
            .await;
    }
}

#[tokio::test]
async fn test_handle_echo_command() {
    let env = TestEnv::new_master_server();

    let test_cases = vec![
        (
            TestUtils::command(&["ECHO", "hey there"]),
            TestUtils::expected_bulk_string("hey there"),
        ),
        (
            TestUtils::command(&["echo", ""]),
            TestUtils::expected_bulk_string(""),
        ),
        (
            TestUtils::command(&["ECHO"]),
            TestUtils::expected_error("ERR wrong number of arguments for 'echo' command"),
        ),
        (
            TestUtils::command(&["ECHO", "a", "b"]),
            TestUtils::expected_error("ERR wrong number of arguments for 'echo' command"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_expect(command, &TestUtils::client_address(41002), expected)
            .await;
    }
}

#[tokio::test]
async fn test_unknown_command() {
    let env = TestEnv::new_master_server();

    env.exec_command_expect(
        TestUtils::command(&["flushall"]),
        &TestUtils::client_address(41003),
        TestUtils::expected_error("ERR unknown command 'FLUSHALL'"),
    )
    .await;
}
