use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_incr_command() {
    let env = TestEnv::new_master_server();
    let client_address = TestUtils::client_address(43001);

    let test_cases = vec![
        (
            TestUtils::command(&["INCR", "counter"]),
            TestUtils::expected_integer(1),
        ),
        (
            TestUtils::command(&["INCR", "counter"]),
            TestUtils::expected_integer(2),
        ),
        (TestUtils::set_command("views", "41"), TestUtils::ok()),
        (
            TestUtils::command(&["incr", "views"]),
            TestUtils::expected_integer(42),
        ),
        (
            TestUtils::get_command("views"),
            TestUtils::expected_bulk_string("42"),
        ),
        (TestUtils::set_command("name", "grape"), TestUtils::ok()),
        (
            TestUtils::command(&["INCR", "name"]),
            TestUtils::expected_error("ERR value is not an integer or out of range"),
        ),
        (
            TestUtils::set_command("max", &i64::MAX.to_string()),
            TestUtils::ok(),
        ),
        (
            TestUtils::command(&["INCR", "max"]),
            TestUtils::expected_error("ERR value is not an integer or out of range"),
        ),
        (
            TestUtils::lpush_command("fruits", &["apple"]),
            TestUtils::expected_integer(1),
        ),
        (
            TestUtils::command(&["INCR", "fruits"]),
            TestUtils::expected_error(
                "WRONGTYPE Operation against a key holding the wrong kind of value",
            ),
        ),
        (
            TestUtils::command(&["INCR"]),
            TestUtils::expected_error("ERR wrong number of arguments for 'incr' command"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_expect(command, &client_address, expected)
            .await;
    }
}
