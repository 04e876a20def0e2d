use std::cell::RefCell;
use std::rc::Rc;

use futures::future::join_all;

use callsim_core::{SimError, Simulation};

#[test]
fn test_sleep_advances_time() {
    let mut sim = Simulation::new(42);
    let ctx = sim.create_context("sleeper");

    sim.spawn(async move {
        assert_eq!(ctx.time(), 0.);
        ctx.sleep(5.)?.await;
        assert_eq!(ctx.time(), 5.);
        ctx.sleep_until(7.5)?.await;
        assert_eq!(ctx.time(), 7.5);
        ctx.sleep(0.)?.await;
        assert_eq!(ctx.time(), 7.5);
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(sim.time(), 7.5);
    assert_eq!(sim.event_count(), 3);
    assert_eq!(sim.live_process_count(), 0);
}

#[test]
fn test_equal_time_wakeups_follow_scheduling_order() {
    let mut sim = Simulation::new(42);
    let order = Rc::new(RefCell::new(Vec::new()));

    for i in 0..5 {
        let ctx = sim.create_context(format!("proc-{}", i));
        let order = order.clone();
        sim.spawn(async move {
            ctx.sleep(1.)?.await;
            order.borrow_mut().push(i);
            Ok::<(), SimError>(())
        });
    }

    sim.step_until_no_events().unwrap();
    assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_concurrent_timers_in_one_process() {
    let mut sim = Simulation::new(42);
    let ctx = sim.create_context("waiter");
    let finished = Rc::new(RefCell::new(Vec::new()));
    let log = finished.clone();

    sim.spawn(async move {
        let timers = (1..=4)
            .map(|i| ctx.sleep(i as f64 * 2.))
            .collect::<Result<Vec<_>, _>>()?;
        join_all(timers).await;
        log.borrow_mut().push(ctx.time());
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(*finished.borrow(), vec![8.]);
}

#[test]
fn test_run_until_stops_at_horizon() {
    let mut sim = Simulation::new(42);
    let ctx = sim.create_context("ticker");
    let ticks = Rc::new(RefCell::new(Vec::new()));
    let log = ticks.clone();

    sim.spawn(async move {
        while ctx.time() < 1000. {
            ctx.sleep(2.)?.await;
            log.borrow_mut().push(ctx.time());
        }
        Ok::<(), SimError>(())
    });

    sim.run_until(7.).unwrap();
    assert_eq!(sim.time(), 7.);
    assert_eq!(*ticks.borrow(), vec![2., 4., 6.]);
    assert_eq!(sim.pending_event_count(), 1);
    assert_eq!(sim.live_process_count(), 1);

    // events due exactly at the horizon are dispatched
    sim.run_until(10.).unwrap();
    assert_eq!(*ticks.borrow(), vec![2., 4., 6., 8., 10.]);
    assert_eq!(sim.time(), 10.);
}

#[test]
fn test_run_until_rejects_past_horizon() {
    let mut sim = Simulation::new(42);
    sim.run_until(5.).unwrap();
    assert_eq!(sim.run_until(3.), Err(SimError::InvalidDuration { delay: -2. }));
    assert_eq!(sim.time(), 5.);
}

#[test]
fn test_negative_sleep_fails_the_run() {
    let mut sim = Simulation::new(42);
    let ctx = sim.create_context("broken");
    let other_ctx = sim.create_context("other");
    let reached = Rc::new(RefCell::new(false));
    let flag = reached.clone();

    sim.spawn(async move {
        ctx.sleep(1.)?.await;
        ctx.sleep(-3.)?.await;
        Ok::<(), SimError>(())
    });
    sim.spawn(async move {
        other_ctx.sleep(50.)?.await;
        *flag.borrow_mut() = true;
        Ok::<(), SimError>(())
    });

    assert_eq!(sim.run_until(100.), Err(SimError::InvalidDuration { delay: -3. }));
    assert_eq!(sim.time(), 1.);
    assert!(!*reached.borrow());
}

#[test]
fn test_dropped_timer_is_cancelled() {
    let mut sim = Simulation::new(42);
    let ctx = sim.create_context("impatient");

    sim.spawn(async move {
        let timer = ctx.sleep(100.)?;
        assert!(!timer.is_completed());
        drop(timer);
        ctx.sleep(1.)?.await;
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(sim.time(), 1.);
    assert_eq!(sim.event_count(), 2);
    assert_eq!(sim.pending_event_count(), 0);
}

#[test]
fn test_spawn_from_process() {
    let mut sim = Simulation::new(42);
    let ctx = sim.create_context("parent");
    let times = Rc::new(RefCell::new(Vec::new()));
    let log = times.clone();

    sim.spawn(async move {
        for _ in 0..3 {
            ctx.sleep(1.)?.await;
            let child_ctx = ctx.clone();
            let log = log.clone();
            ctx.spawn(async move {
                let started = child_ctx.time();
                child_ctx.sleep(0.5)?.await;
                log.borrow_mut().push((started, child_ctx.time()));
                Ok::<(), SimError>(())
            });
        }
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(*times.borrow(), vec![(1., 1.5), (2., 2.5), (3., 3.5)]);
    assert_eq!(sim.process_count(), 4);
    assert_eq!(sim.live_process_count(), 0);
}

#[test]
fn test_same_seed_same_random_sequence() {
    let mut sim1 = Simulation::new(7);
    let mut sim2 = Simulation::new(7);
    for _ in 0..10 {
        assert_eq!(sim1.rand(), sim2.rand());
    }
}
