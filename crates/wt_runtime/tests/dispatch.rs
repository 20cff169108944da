//! Dispatch engine: trap/pass, nesting, pools, idle policy.
use std::sync::mpsc;
use std::time::Duration;

use wt_runtime::{
    CompileOutcome, DispatchEngine, IdlePolicy, PartSpec, RuntimeConfig, RuntimeError,
    ScriptTarget, Value,
};

fn engine() -> DispatchEngine {
    DispatchEngine::new(RuntimeConfig::default())
}

fn target_with(engine: &DispatchEngine, src: &str) -> ScriptTarget {
    let script = engine.compile(src).expect("script should compile");
    ScriptTarget::new(PartSpec::new("button \"test\""), script)
}

#[test]
fn handler_without_pass_traps_the_message() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on greet\n\
         global said\n\
         put \"hello\" into said\n\
         end greet",
    );
    let outcome = engine.dispatch_handler(&target, "greet", Vec::new()).wait();
    assert!(outcome.trapped);
    assert!(outcome.error.is_none());
    assert_eq!(engine.globals().get("said").as_str(), "hello");
}

#[test]
fn absent_handler_is_untrapped_without_running_anything() {
    let engine = engine();
    let target = target_with(&engine, "on other\nput 1 into x\nend other");
    let outcome = engine.dispatch_handler(&target, "greet", Vec::new()).wait();
    assert!(!outcome.trapped);
    assert!(outcome.error.is_none());
}

#[test]
fn passing_the_same_message_untraps_it() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on greet\n\
         global ran\n\
         put true into ran\n\
         pass greet\n\
         end greet",
    );
    let outcome = engine.dispatch_handler(&target, "greet", Vec::new()).wait();
    assert!(!outcome.trapped);
    assert!(outcome.error.is_none());
    // The statements before `pass` still ran.
    assert_eq!(engine.globals().get("ran").as_bool(), Some(true));
}

#[test]
fn passing_a_different_message_is_an_error_and_stops_propagation() {
    let engine = engine();
    let target = target_with(&engine, "on greet\npass farewell\nend greet");
    let outcome = engine.dispatch_handler(&target, "greet", Vec::new()).wait();
    assert!(outcome.trapped);
    match outcome.error {
        Some(RuntimeError::Semantic(msg)) => {
            assert!(msg.contains("farewell"), "got: {msg}");
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn statements_after_pass_do_not_run() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on greet\n\
         pass greet\n\
         global after\n\
         put \"ran\" into after\n\
         end greet",
    );
    engine.dispatch_handler(&target, "greet", Vec::new()).wait();
    assert_eq!(engine.globals().get("after").as_str(), "");
}

#[test]
fn nested_sends_run_inline_even_with_one_worker() {
    let config = RuntimeConfig {
        exec_workers: 1,
        ..RuntimeConfig::default()
    };
    let engine = DispatchEngine::new(config);
    let target = target_with(
        &engine,
        "on outer\n\
         send \"inner\" to me\n\
         global trace\n\
         put trace & \"o\" into trace\n\
         end outer\n\
         on inner\n\
         send \"leaf\" to me\n\
         end inner\n\
         on leaf\n\
         global trace\n\
         put \"l\" into trace\n\
         end leaf",
    );
    // Three nesting levels against a single pool slot: inline dispatch
    // means this completes instead of deadlocking.
    let outcome = engine.dispatch_handler(&target, "outer", Vec::new()).wait();
    assert!(outcome.trapped);
    assert!(outcome.error.is_none());
    assert_eq!(engine.globals().get("trace").as_str(), "lo");
}

#[test]
fn sent_messages_carry_arguments_evaluated_by_the_sender() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on go\n\
         global n\n\
         put 20 into n\n\
         send \"record n + 1\" to me\n\
         end go\n\
         on record x\n\
         global got\n\
         put x into got\n\
         end record",
    );
    engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert_eq!(engine.globals().get("got").as_str(), "21");
}

#[test]
fn user_functions_return_values() {
    let engine = engine();
    let target = target_with(
        &engine,
        "function doubled n\n\
         return n * 2\n\
         end doubled\n\
         on go\n\
         global out\n\
         put doubled(21) into out\n\
         end go",
    );
    engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert_eq!(engine.globals().get("out").as_str(), "42");

    let direct = engine
        .execute_function(&target, "doubled", vec![Value::from_int(5)])
        .unwrap();
    assert_eq!(direct.as_str(), "10");
}

#[test]
fn calling_a_missing_function_is_an_error() {
    let engine = engine();
    let target = target_with(&engine, "on go\nend go");
    let err = engine
        .execute_function(&target, "nope", Vec::new())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Semantic(_)));
}

#[test]
fn argument_count_mismatch_still_runs_with_partial_bindings() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on greet first, second\n\
         global out\n\
         put first & \",\" & second into out\n\
         end greet",
    );
    let outcome = engine
        .dispatch_handler(&target, "greet", vec![Value::new("x")])
        .wait();
    assert!(outcome.trapped);
    // The missing parameter binds to empty; the body ran anyway.
    assert_eq!(engine.globals().get("out").as_str(), "x,");
}

#[test]
fn get_binds_the_global_it() {
    let engine = engine();
    let target = target_with(&engine, "on go\nget 7 * 6\nend go");
    engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert_eq!(engine.globals().get("it").as_str(), "42");
}

#[test]
fn unset_local_reads_as_its_own_name() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on go\n\
         global out\n\
         put banana into out\n\
         end go",
    );
    engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert_eq!(engine.globals().get("out").as_str(), "banana");
}

#[test]
fn put_without_destination_writes_to_the_output_buffer() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on go\n\
         put \"first\"\n\
         put 2 + 2\n\
         end go",
    );
    engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert_eq!(engine.take_output(), "first\n4\n");
    assert_eq!(engine.take_output(), "");
}

#[test]
fn chunk_containers_compose_outside_in() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on go\n\
         global out\n\
         put \"aa,bb,cc\" into out\n\
         put \"X\" into char 1 of item 2 of out\n\
         end go",
    );
    engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert_eq!(engine.globals().get("out").as_str(), "aa,Xb,cc");
}

#[test]
fn repeat_forms_and_loop_control() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on go\n\
         global out\n\
         put \"\" into out\n\
         repeat with i = 1 to 5\n\
         if i = 3 then next repeat\n\
         if i = 5 then exit repeat\n\
         put out & i into out\n\
         end repeat\n\
         end go",
    );
    let outcome = engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert!(outcome.error.is_none());
    assert_eq!(engine.globals().get("out").as_str(), "124");
}

#[test]
fn runtime_faults_trap_and_surface_the_error() {
    let engine = engine();
    let target = target_with(&engine, "on go\nput 1 / 0 into x\nend go");
    let outcome = engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert!(outcome.trapped);
    assert_eq!(outcome.error, Some(RuntimeError::DivideByZero));
}

#[test]
fn runaway_recursion_is_cut_off() {
    let engine = engine();
    let target = target_with(&engine, "on go\nsend \"go\" to me\nend go");
    let outcome = engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert!(outcome.trapped);
    assert!(matches!(outcome.error, Some(RuntimeError::Fault(_))));
}

#[test]
fn unknown_commands_cant_be_understood() {
    let engine = engine();
    let target = target_with(&engine, "on go\nflumph 1, 2\nend go");
    let outcome = engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert!(outcome.trapped);
    assert!(matches!(outcome.error, Some(RuntimeError::Fault(_))));
}

#[test]
fn execute_statements_reports_a_passed_message() {
    let engine = engine();
    let target = ScriptTarget::anonymous();

    let handle = engine.execute_statements(&target, "global g\nput 5 into g");
    assert_eq!(handle.wait().unwrap(), None);
    assert_eq!(engine.globals().get("g").as_str(), "5");

    let handle = engine.execute_statements(&target, "pass mouseUp");
    assert_eq!(handle.wait().unwrap(), Some("mouseUp".to_string()));
}

#[test]
fn do_runs_text_in_its_own_frame() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on go\n\
         put \"put 7\" into cmd\n\
         do cmd\n\
         end go",
    );
    let outcome = engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert!(outcome.error.is_none());
    assert_eq!(engine.take_output(), "7\n");
}

#[test]
fn evaluate_falls_back_to_the_literal_text() {
    let engine = engine();
    assert_eq!(engine.evaluate("2 + 3 * 4").unwrap().as_str(), "14");
    assert_eq!(
        engine.evaluate("item 2 of \"a,b,c\"").unwrap().as_str(),
        "b"
    );
    // Not a well-formed expression: the text is its own value.
    assert_eq!(engine.evaluate("hello there").unwrap().as_str(), "hello there");
}

#[test]
fn completion_callbacks_run_on_the_listener_pool() {
    let engine = engine();
    let target = target_with(&engine, "on go\nput 1 into x\nend go");
    let (tx, rx) = mpsc::channel();
    engine
        .dispatch_handler(&target, "go", Vec::new())
        .on_complete(move |outcome| {
            let _ = tx.send(outcome.trapped);
        });
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
}

#[test]
fn wait_timeout_resolves_for_a_finished_handler() {
    let engine = engine();
    let target = target_with(&engine, "on go\nend go");
    let handle = engine.dispatch_handler(&target, "go", Vec::new());
    let outcome = handle.wait_timeout(Duration::from_secs(5));
    assert!(outcome.is_some());
}

#[test]
fn compile_rejects_malformed_scripts() {
    let engine = engine();
    let err = engine.compile("on go\nput \"unterminated\nend go").unwrap_err();
    assert!(matches!(err, RuntimeError::Syntax(_)));
}

#[test]
fn background_and_preemptive_compiles_resolve() {
    let engine = engine();
    let handle = engine.compile_in_background("on go\nend go".to_string());
    assert!(matches!(handle.wait(), CompileOutcome::Done(_)));

    let first = engine.compile_preemptive("on a\nend a".to_string());
    let second = engine.compile_preemptive("on b\nend b".to_string());
    // The newest submission always completes; the older one either ran
    // before the replacement or reports it was superseded.
    assert!(matches!(second.wait(), CompileOutcome::Done(_)));
    assert!(matches!(
        first.wait(),
        CompileOutcome::Done(_) | CompileOutcome::Superseded
    ));
}

#[test]
fn idle_policy_skips_busy_ticks_without_consuming_suppression() {
    let mut policy = IdlePolicy::new(2);
    assert!(policy.should_send(false));

    policy.note_fault();
    assert!(policy.is_suppressed());
    // Busy ticks never send and never count against the backoff.
    assert!(!policy.should_send(true));
    assert!(policy.is_suppressed());

    assert!(!policy.should_send(false));
    assert!(!policy.should_send(false));
    assert!(policy.should_send(false));
}

#[test]
fn idle_policy_resets_on_each_fault() {
    let mut policy = IdlePolicy::new(1);
    policy.note_fault();
    assert!(!policy.should_send(false));
    policy.note_fault();
    assert!(!policy.should_send(false));
    assert!(policy.should_send(false));
}

#[test]
fn loop_counter_overflow_faults_only_its_handler() {
    let config = RuntimeConfig {
        exec_workers: 1,
        ..RuntimeConfig::default()
    };
    let engine = DispatchEngine::new(config);
    let target = target_with(
        &engine,
        "on spin\n\
         repeat with i = 9223372036854775807 to 9223372036854775807\n\
         put i into x\n\
         end repeat\n\
         end spin\n\
         on again\n\
         global ok\n\
         put true into ok\n\
         end again",
    );
    let outcome = engine.dispatch_handler(&target, "spin", Vec::new()).wait();
    assert!(outcome.trapped);
    assert_eq!(outcome.error, Some(RuntimeError::Overflow { op: "+" }));

    // The single worker is still alive and the pool drains back to idle.
    let outcome = engine.dispatch_handler(&target, "again", Vec::new()).wait();
    assert!(outcome.error.is_none());
    assert_eq!(engine.globals().get("ok").as_bool(), Some(true));
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while engine.exec_busy() && std::time::Instant::now() < deadline {
        std::thread::yield_now();
    }
    assert!(!engine.exec_busy());
}

#[test]
fn a_panicking_job_does_not_poison_the_pool() {
    use wt_runtime::dispatch::WorkerPool;

    let pool = WorkerPool::new("test-pool", 1);
    pool.submit(|| panic!("job blew up"));
    let (tx, rx) = mpsc::channel();
    pool.submit(move || {
        let _ = tx.send(());
    });
    // The lone worker survived the panic and ran the second job.
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !pool.is_idle() && std::time::Instant::now() < deadline {
        std::thread::yield_now();
    }
    assert!(pool.is_idle());
}

#[test]
fn the_result_tracks_the_last_handlers_return() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on helper\n\
         return 7\n\
         end helper\n\
         on quiet\n\
         end quiet\n\
         on go\n\
         helper\n\
         put the result\n\
         quiet\n\
         put the result\n\
         end go",
    );
    let outcome = engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert!(outcome.error.is_none());
    // `helper` set the result; `quiet` returned nothing and reset it.
    assert_eq!(engine.take_output(), "7\n\n");
}

#[test]
fn send_sets_the_result_too() {
    let engine = engine();
    let target = target_with(
        &engine,
        "on lookup\n\
         return \"found\"\n\
         end lookup\n\
         on go\n\
         send \"lookup\" to me\n\
         global out\n\
         put the result into out\n\
         end go",
    );
    engine.dispatch_handler(&target, "go", Vec::new()).wait();
    assert_eq!(engine.globals().get("out").as_str(), "found");
}
