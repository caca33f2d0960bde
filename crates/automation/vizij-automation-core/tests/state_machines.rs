use vizij_automation_core::{
    evaluate_transitions, parse_state_machine_json, sample, Condition, CoreEvent, Engine,
    EntityId, StateMachine, Stateful, World,
};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn small_positive_parameter_switches_state() {
    let mut sm = StateMachine::new();
    sm.add_state("A").unwrap();
    sm.add_state("B").unwrap();
    sm.set_entry_state("A").unwrap();
    sm.add_transition("A", "B", "p", Condition::GreaterThan, 0.0)
        .unwrap();

    let mut stateful = Stateful::new();
    stateful.add_parameter("p", 0.0).unwrap();

    let machine = EntityId(0);
    let outcome = evaluate_transitions(&sm, machine, &mut stateful).unwrap();
    assert_eq!(sm.state_name(outcome.current), Some("A"));
    let outcome = evaluate_transitions(&sm, machine, &mut stateful).unwrap();
    assert!(!outcome.is_change());

    stateful.set_parameter("p", 0.05).unwrap();
    let outcome = evaluate_transitions(&sm, machine, &mut stateful).unwrap();
    assert!(outcome.fired);
    assert_eq!(sm.state_name(outcome.current), Some("B"));
}

#[test]
fn engine_reports_entry_assignment_then_transition() {
    let mut engine = Engine::default();
    let mut world = World::new();
    let machine = world.create_entity();
    let entity = world.create_entity();

    let json = vizij_test_fixtures::state_machines::json("entry-other").expect("fixture");
    engine.load_state_machine_json(machine, &json).unwrap();
    engine
        .add_stateful(entity)
        .add_parameter("pastrami", 0.0)
        .unwrap();
    engine
        .set_state_machine(&mut world, entity, machine)
        .unwrap();

    // Bound with entry already assigned; nothing fires while the parameter is zero.
    assert!(engine.update(&mut world, 0.1).is_empty());

    engine.set_parameter(entity, "pastrami", 3.0).unwrap();
    let other = engine.state_machine(machine).unwrap().state_index("Other").unwrap();
    let entry = engine.state_machine(machine).unwrap().state_index("Entry");
    let events = engine.update(&mut world, 0.1).events.clone();
    assert_eq!(
        events,
        vec![CoreEvent::StateChanged {
            entity,
            from: entry,
            to: other,
        }]
    );
}

#[test]
fn idle_walk_fixture_round_trips_through_ticks() {
    let json = vizij_test_fixtures::state_machines::json("idle-walk").expect("fixture");
    let sm = parse_state_machine_json(&json).unwrap();
    assert_eq!(sm.transitions().len(), 2);

    let mut stateful = Stateful::new();
    stateful.add_parameter("speed", 0.0).unwrap();
    let machine = EntityId(1);

    let mut names = Vec::new();
    for speed in [0.0, 0.5, 0.5, 0.1, 0.2] {
        stateful.set_parameter("speed", speed).unwrap();
        let outcome = evaluate_transitions(&sm, machine, &mut stateful).unwrap();
        names.push(sm.state_name(outcome.current).unwrap().to_string());
    }
    assert_eq!(names, ["Idle", "Walk", "Walk", "Idle", "Walk"]);
}

#[test]
fn automation_fixtures_load_through_engine_registry() {
    let mut engine = Engine::default();
    let track = EntityId(0);
    for key in ["triangle", "vec3-move", "hold-steps"] {
        let json = vizij_test_fixtures::automations::json(key).expect("fixture");
        engine.load_track_json(track, &json).unwrap();
    }

    let json = vizij_test_fixtures::automations::json("triangle").unwrap();
    engine.load_track_json(track, &json).unwrap();
    let tri = engine.track(track).unwrap();
    assert!(tri.looping);
    let v = sample::<f32>(tri, 2.5, engine.registry()).unwrap();
    assert!(approx(v, 0.5, 1e-6));

    let json = vizij_test_fixtures::automations::json("hold-steps").unwrap();
    engine.load_track_json(track, &json).unwrap();
    let held = engine.track(track).unwrap();
    assert_eq!(held.interpolation, None);
    assert_eq!(
        sample::<[f32; 2]>(held, 1.75, engine.registry()).unwrap(),
        [3.0, 4.0]
    );
}
