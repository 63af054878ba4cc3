use redis_kv::resp::RespValue;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_lpush_and_lrange_commands() {
    let env = TestEnv::new_master_server();
    let client_address = TestUtils::client_address(44001);

    let test_cases = vec![
        (
            TestUtils::lpush_command("fruits", &["a", "b", "c"]),
            TestUtils::expected_integer(3),
        ),
        (
            TestUtils::lpush_command("fruits", &["d"]),
            TestUtils::expected_integer(4),
        ),
        (
            TestUtils::lrange_command("fruits", 0, -1),
            TestUtils::expected_bulk_string_array(&["d", "c", "b", "a"]),
        ),
        (
            TestUtils::lrange_command("fruits", 1, 2),
            TestUtils::expected_bulk_string_array(&["c", "b"]),
        ),
        (
            TestUtils::lrange_command("fruits", -2, -1),
            TestUtils::expected_bulk_string_array(&["b", "a"]),
        ),
        (
            TestUtils::lrange_command("fruits", -100, 100),
            TestUtils::expected_bulk_string_array(&["d", "c", "b", "a"]),
        ),
        (
            TestUtils::lrange_command("fruits", 3, 1),
            TestUtils::expected_bulk_string_array(&[]),
        ),
        (
            TestUtils::lrange_command("fruits", 10, 20),
            TestUtils::expected_bulk_string_array(&[]),
        ),
        (
            TestUtils::lrange_command("vegetables", 0, -1),
            TestUtils::expected_bulk_string_array(&[]),
        ),
        (
            TestUtils::command(&["LRANGE", "fruits", "zero", "-1"]),
            TestUtils::expected_error("ERR value is not an integer or out of range"),
        ),
        (
            TestUtils::command(&["LPUSH", "fruits"]),
            TestUtils::expected_error("ERR wrong number of arguments for 'lpush' command"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_expect(command, &client_address, expected)
            .await;
    }
}

#[tokio::test]
async fn test_handle_llen_and_lpop_commands() {
    let env = TestEnv::new_master_server();
    let client_address = TestUtils::client_address(44002);

    let test_cases = vec![
        (
            TestUtils::command(&["LLEN", "fruits"]),
            TestUtils::expected_integer(0),
        ),
        (
            TestUtils::command(&["LPOP", "fruits"]),
            RespValue::NullBulkString,
        ),
        (
            TestUtils::lpush_command("fruits", &["a", "b"]),
            TestUtils::expected_integer(2),
        ),
        (
            TestUtils::command(&["LLEN", "fruits"]),
            TestUtils::expected_integer(2),
        ),
        (
            TestUtils::command(&["LPOP", "fruits"]),
            TestUtils::expected_bulk_string("b"),
        ),
        (
            TestUtils::command(&["LPOP", "fruits"]),
            TestUtils::expected_bulk_string("a"),
        ),
        (
            TestUtils::command(&["LPOP", "fruits"]),
            RespValue::NullBulkString,
        ),
        (
            TestUtils::command(&["LLEN", "fruits"]),
            TestUtils::expected_integer(0),
        ),
        (
            TestUtils::command(&["LLEN"]),
            TestUtils::expected_error("ERR wrong number of arguments for 'llen' command"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_expect(command, &client_address, expected)
            .await;
    }
}

#[tokio::test]
async fn test_lpush_replaces_a_string_with_a_list() {
    let env = TestEnv::new_master_server();
    let client_address = TestUtils::client_address(44003);

    env.exec_command_expect(
        TestUtils::set_command("fruits", "apple"),
        &client_address,
        TestUtils::ok(),
    )
    .await;

    env.exec_command_expect(
        TestUtils::lpush_command("fruits", &["kiwi"]),
        &client_address,
        TestUtils::expected_integer(1),
    )
    .await;

    env.exec_command_expect(
        TestUtils::command(&["TYPE", "fruits"]),
        &client_address,
        RespValue::SimpleString("list".to_string()),
    )
    .await;
}
