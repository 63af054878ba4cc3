use std::time::Duration;

use redis_kv::{commands::blocking::BLPOP, resp::RespValue};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_blpop_command_direct_response() {
    let env = TestEnv::new_master_server();
    let client_address = TestUtils::client_address(48001);

    let test_cases = vec![
        (
            TestUtils::lpush_command("grape", &["apple", "raspberry", "mango"]),
            TestUtils::expected_integer(3),
        ),
        (
            TestUtils::blpop_command(&["grape"], "0"),
            TestUtils::expected_bulk_string_array(&["grape", "mango"]),
        ),
        (
            TestUtils::blpop_command(&["empty", "grape"], "0.5"),
            TestUtils::expected_bulk_string_array(&["grape", "raspberry"]),
        ),
        (
            TestUtils::blpop_command(&["grape"], "-1"),
            TestUtils::expected_error("ERR timeout is negative"),
        ),
        (
            TestUtils::blpop_command(&["grape"], "soon"),
            TestUtils::expected_error("ERR timeout is not a float or out of range"),
        ),
        (
            TestUtils::command(&["BLPOP", "grape"]),
            TestUtils::expected_error("ERR wrong number of arguments for 'blpop' command"),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_expect(command, &client_address, expected)
            .await;
    }
}

#[tokio::test]
async fn test_blpop_times_out() {
    let env = TestEnv::new_master_server();

    env.exec_command_expect(
        TestUtils::blpop_command(&["grape"], "0.1"),
        &TestUtils::client_address(48002),
        RespValue::NullArray,
    )
    .await;

    assert_eq!(env.state.lock().await.subscriber_count(BLPOP, "grape"), 0);
}

#[tokio::test]
async fn test_blpop_concurrent_clients_simple_blocking() {
    let env = TestEnv::new_master_server();

    let client_task =
        TestUtils::spawn_blpop_task(&env, &["test_list"], "2", &TestUtils::client_address(48003));

    TestUtils::wait_for_subscribers(&env, BLPOP, "test_list", 1).await;

    env.exec_command_expect(
        TestUtils::lpush_command("test_list", &["item1"]),
        &TestUtils::client_address(48004),
        TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(client_task, Duration::from_secs(3)).await,
        Ok(TestUtils::expected_bulk_string_array(&["test_list", "item1"]))
    );

    // The element went to the blocked client, not back onto the list.
    env.exec_command_expect(
        TestUtils::command(&["LLEN", "test_list"]),
        &TestUtils::client_address(48004),
        TestUtils::expected_integer(0),
    )
    .await;
}

#[tokio::test]
async fn test_blpop_on_several_keys_wakes_for_any_of_them() {
    let env = TestEnv::new_master_server();

    let client_task = TestUtils::spawn_blpop_task(
        &env,
        &["first", "second"],
        "0",
        &TestUtils::client_address(48005),
    );

    TestUtils::wait_for_subscribers(&env, BLPOP, "second", 1).await;

    env.exec_command_expect(
        TestUtils::lpush_command("second", &["value"]),
        &TestUtils::client_address(48006),
        TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(client_task, Duration::from_secs(3)).await,
        Ok(TestUtils::expected_bulk_string_array(&["second", "value"]))
    );

    let state = env.state.lock().await;
    assert_eq!(state.subscriber_count(BLPOP, "first"), 0);
    assert_eq!(state.subscriber_count(BLPOP, "second"), 0);
}

#[tokio::test]
async fn test_blpop_clients_are_served_in_arrival_order() {
    let env = TestEnv::new_master_server();

    let first =
        TestUtils::spawn_blpop_task(&env, &["queue"], "3", &TestUtils::client_address(48011));
    TestUtils::wait_for_subscribers(&env, BLPOP, "queue", 1).await;

    let second =
        TestUtils::spawn_blpop_task(&env, &["queue"], "3", &TestUtils::client_address(48012));
    TestUtils::wait_for_subscribers(&env, BLPOP, "queue", 2).await;

    env.exec_command_expect(
        TestUtils::lpush_command("queue", &["job1"]),
        &TestUtils::client_address(48013),
        TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(first, Duration::from_secs(2)).await,
        Ok(TestUtils::expected_bulk_string_array(&["queue", "job1"]))
    );

    env.exec_command_expect(
        TestUtils::lpush_command("queue", &["job2"]),
        &TestUtils::client_address(48013),
        TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(second, Duration::from_secs(2)).await,
        Ok(TestUtils::expected_bulk_string_array(&["queue", "job2"]))
    );
}

#[tokio::test]
async fn test_lpush_with_several_elements_wakes_several_clients() {
    let env = TestEnv::new_master_server();

    let tasks: Vec<_> = (0..3)
        .map(|i| {
            TestUtils::spawn_blpop_task(
                &env,
                &["queue"],
                "3",
                &TestUtils::client_address(48020 + i),
            )
        })
        .collect();

    TestUtils::wait_for_subscribers(&env, BLPOP, "queue", 3).await;

    env.exec_command_expect(
        TestUtils::lpush_command("queue", &["a", "b", "c"]),
        &TestUtils::client_address(48030),
        TestUtils::expected_integer(3),
    )
    .await;

    let mut popped = Vec::new();
    for task in tasks {
        let response = TestUtils::wait_for_completion(task, Duration::from_secs(3))
            .await
            .expect("client was woken");

        let RespValue::Array(values) = response else {
            panic!("Expected array, got {:?}", response);
        };
        popped.push(values[1].clone());
    }

    popped.sort_by_key(|value| format!("{:?}", value));
    assert_eq!(
        popped,
        vec![
            TestUtils::expected_bulk_string("a"),
            TestUtils::expected_bulk_string("b"),
            TestUtils::expected_bulk_string("c"),
        ]
    );
}

#[tokio::test]
async fn test_blpop_gives_up_when_the_client_hangs_up() {
    let env = TestEnv::new_master_server();
    let mut client = env.client(&TestUtils::client_address(48040));
    let client_closed = client.client_closed();

    let client_task = tokio::spawn(async move {
        client
            .dispatch(TestUtils::blpop_command(&["queue"], "0"))
            .await
    });

    TestUtils::wait_for_subscribers(&env, BLPOP, "queue", 1).await;
    client_closed.cancel();

    assert_eq!(
        TestUtils::wait_for_completion(client_task, Duration::from_secs(2)).await,
        Ok(RespValue::NullArray)
    );
    assert_eq!(env.state.lock().await.subscriber_count(BLPOP, "queue"), 0);

    // The next push stays on the list instead of going to the departed client.
    env.exec_command_expect(
        TestUtils::lpush_command("queue", &["job"]),
        &TestUtils::client_address(48041),
        TestUtils::expected_integer(1),
    )
    .await;
    env.exec_command_expect(
        TestUtils::command(&["LLEN", "queue"]),
        &TestUtils::client_address(48041),
        TestUtils::expected_integer(1),
    )
    .await;
}

#[tokio::test]
async fn test_aborted_blpop_leaves_no_subscriber_behind() {
    let env = TestEnv::new_master_server();

    let client_task =
        TestUtils::spawn_blpop_task(&env, &["queue"], "0", &TestUtils::client_address(48042));
    TestUtils::wait_for_subscribers(&env, BLPOP, "queue", 1).await;

    client_task.abort();
    assert!(client_task.await.is_err());
    TestUtils::wait_for_no_subscribers(&env, BLPOP, "queue").await;

    env.exec_command_expect(
        TestUtils::lpush_command("queue", &["job"]),
        &TestUtils::client_address(48043),
        TestUtils::expected_integer(1),
    )
    .await;
    env.exec_command_expect(
        TestUtils::command(&["LLEN", "queue"]),
        &TestUtils::client_address(48043),
        TestUtils::expected_integer(1),
    )
    .await;
}

#[tokio::test]
async fn test_wake_up_of_a_departed_client_reaches_the_next_one() {
    let env = TestEnv::new_master_server();

    let departed =
        TestUtils::spawn_blpop_task(&env, &["queue"], "0", &TestUtils::client_address(48044));
    TestUtils::wait_for_subscribers(&env, BLPOP, "queue", 1).await;

    let waiting =
        TestUtils::spawn_blpop_task(&env, &["queue"], "3", &TestUtils::client_address(48045));
    TestUtils::wait_for_subscribers(&env, BLPOP, "queue", 2).await;

    departed.abort();
    assert!(departed.await.is_err());

    env.exec_command_expect(
        TestUtils::lpush_command("queue", &["job"]),
        &TestUtils::client_address(48046),
        TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(waiting, Duration::from_secs(2)).await,
        Ok(TestUtils::expected_bulk_string_array(&["queue", "job"]))
    );
}
