use std::cell::RefCell;
use std::rc::Rc;

use callsim_core::{AwaitResult, RequestStatus, ResourcePool, SimError, Simulation};

fn pool(sim: &mut Simulation, capacity: u32) -> Rc<ResourcePool> {
    let ctx = sim.create_context("pool");
    Rc::new(ResourcePool::new(capacity, ctx).unwrap())
}

#[test]
fn test_zero_capacity_is_rejected() {
    let mut sim = Simulation::new(42);
    let ctx = sim.create_context("pool");
    assert_eq!(
        ResourcePool::new(0, ctx).err(),
        Some(SimError::InvalidCapacity { capacity: 0 })
    );
}

#[test]
fn test_acquire_grants_until_capacity() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 2);

    let first = pool.acquire();
    let second = pool.acquire();
    let third = pool.acquire();
    assert_eq!(first.status(), RequestStatus::Granted);
    assert_eq!(second.status(), RequestStatus::Granted);
    assert_eq!(third.status(), RequestStatus::Pending);
    assert!(first.granted().is_completed());
    assert!(!third.granted().is_completed());
    assert_eq!(pool.in_use(), 2);
    assert_eq!(pool.queue_len(), 1);

    pool.release();
    assert_eq!(third.status(), RequestStatus::Granted);
    assert_eq!(pool.in_use(), 2);
    assert_eq!(pool.queue_len(), 0);

    // the grant is delivered by an event at the current time
    assert!(!third.granted().is_completed());
    sim.step();
    assert!(third.granted().is_completed());
    assert_eq!(sim.time(), 0.);

    let stats = pool.stats();
    assert_eq!(stats.requests, 3);
    assert_eq!(stats.immediate_grants, 2);
    assert_eq!(stats.promoted_grants, 1);
    assert_eq!(stats.grants(), 3);
    assert_eq!(stats.peak_in_use, 2);
    assert_eq!(stats.peak_queue_len, 1);
}

#[test]
#[should_panic(expected = "release of idle resource pool")]
fn test_release_of_idle_pool_panics() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    pool.release();
}

#[test]
fn test_withdraw() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);

    let holder = pool.acquire();
    let first = pool.acquire();
    let second = pool.acquire();
    assert_eq!(pool.queue_len(), 2);

    assert_eq!(pool.withdraw(&first), RequestStatus::Pending);
    assert_eq!(first.status(), RequestStatus::Withdrawn);
    assert_eq!(pool.queue_len(), 1);

    // repeated and granted withdrawals leave the queue intact
    assert_eq!(pool.withdraw(&first), RequestStatus::Withdrawn);
    assert_eq!(pool.withdraw(&holder), RequestStatus::Granted);
    assert_eq!(pool.queue_len(), 1);
    assert_eq!(pool.in_use(), 1);

    // the withdrawn request is skipped on release
    pool.release();
    assert_eq!(second.status(), RequestStatus::Granted);
    assert_eq!(first.status(), RequestStatus::Withdrawn);
    assert_eq!(pool.stats().withdrawals, 1);
}

#[test]
fn test_waiters_are_served_in_fifo_order() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    let served = Rc::new(RefCell::new(Vec::new()));

    for i in 0..4 {
        let ctx = sim.create_context(format!("user-{}", i));
        let pool = pool.clone();
        let served = served.clone();
        sim.spawn(async move {
            ctx.sleep(i as f64 * 0.1)?.await;
            pool.acquire().granted().await;
            served.borrow_mut().push((i, ctx.time()));
            ctx.sleep(1.)?.await;
            pool.release();
            Ok::<(), SimError>(())
        });
    }

    sim.step_until_no_events().unwrap();
    let served = served.borrow();
    let order: Vec<usize> = served.iter().map(|(i, _)| *i).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);
    for (pos, (_, time)) in served.iter().enumerate() {
        assert!((time - pos as f64).abs() < 1e-9);
    }
    assert_eq!(pool.in_use(), 0);
    assert_eq!(pool.stats().peak_in_use, 1);
}

#[test]
fn test_request_times_out() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    let holder_ctx = sim.create_context("holder");
    let waiter_ctx = sim.create_context("waiter");
    let outcome = Rc::new(RefCell::new(None));

    let holder_pool = pool.clone();
    sim.spawn(async move {
        holder_pool.acquire().granted().await;
        holder_ctx.sleep(10.)?.await;
        holder_pool.release();
        Ok::<(), SimError>(())
    });

    let waiter_pool = pool.clone();
    let waiter_outcome = outcome.clone();
    sim.spawn(async move {
        let request = waiter_pool.acquire();
        let result = request.with_timeout(4.).await?;
        assert_eq!(waiter_pool.withdraw(&request), RequestStatus::Pending);
        *waiter_outcome.borrow_mut() = Some((result, waiter_ctx.time()));
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(*outcome.borrow(), Some((AwaitResult::Timeout { timeout: 4. }, 4.)));
    assert_eq!(pool.stats().promoted_grants, 0);
    assert_eq!(pool.in_use(), 0);
    assert_eq!(sim.time(), 10.);
}

#[test]
fn test_grant_before_timeout_cancels_timer() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    let holder_ctx = sim.create_context("holder");
    let waiter_ctx = sim.create_context("waiter");
    let outcome = Rc::new(RefCell::new(None));

    let holder_pool = pool.clone();
    sim.spawn(async move {
        holder_pool.acquire().granted().await;
        holder_ctx.sleep(2.)?.await;
        holder_pool.release();
        Ok::<(), SimError>(())
    });

    let waiter_pool = pool.clone();
    let waiter_outcome = outcome.clone();
    sim.spawn(async move {
        let request = waiter_pool.acquire();
        let result = request.with_timeout(5.).await?;
        *waiter_outcome.borrow_mut() = Some((result, waiter_ctx.time()));
        waiter_pool.release();
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(*outcome.borrow(), Some((AwaitResult::Granted, 2.)));
    // the abandonment timer at 5 was cancelled
    assert_eq!(sim.time(), 2.);
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn test_timeout_scheduled_first_wins_tie() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    let waiter_ctx = sim.create_context("waiter");
    let holder_ctx = sim.create_context("holder");
    let outcome = Rc::new(RefCell::new(None));

    let holder_pool = pool.clone();
    let holder = pool.acquire();
    assert!(holder.is_granted());

    // waiter timer is scheduled before the holder's service timer, both are due at 3
    let waiter_pool = pool.clone();
    let waiter_outcome = outcome.clone();
    sim.spawn(async move {
        let request = waiter_pool.acquire();
        let result = request.with_timeout(3.).await?;
        let status = waiter_pool.withdraw(&request);
        *waiter_outcome.borrow_mut() = Some((result, status, waiter_ctx.time()));
        Ok::<(), SimError>(())
    });
    sim.spawn(async move {
        holder_ctx.sleep(3.)?.await;
        holder_pool.release();
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(
        *outcome.borrow(),
        Some((AwaitResult::Timeout { timeout: 3. }, RequestStatus::Pending, 3.))
    );
    assert_eq!(pool.in_use(), 0);
    assert_eq!(pool.stats().withdrawals, 1);
}

#[test]
fn test_release_dispatched_before_timeout_wins_tie() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    let holder_ctx = sim.create_context("holder");
    let waiter_ctx = sim.create_context("waiter");
    let outcome = Rc::new(RefCell::new(None));

    let holder = pool.acquire();
    assert!(holder.is_granted());

    // the holder's timer is scheduled first: release assigns the unit to the waiter at 3
    // before the waiter's timer at the same instant is dispatched
    let holder_pool = pool.clone();
    sim.spawn(async move {
        holder_ctx.sleep(3.)?.await;
        holder_pool.release();
        Ok::<(), SimError>(())
    });
    let waiter_pool = pool.clone();
    let waiter_outcome = outcome.clone();
    sim.spawn(async move {
        let request = waiter_pool.acquire();
        let result = request.with_timeout(3.).await?;
        *waiter_outcome.borrow_mut() = Some((result, request.status(), waiter_ctx.time()));
        if result == AwaitResult::Granted {
            waiter_ctx.sleep(1.)?.await;
            waiter_pool.release();
        }
        Ok::<(), SimError>(())
    });

    sim.step_until_no_events().unwrap();
    assert_eq!(
        *outcome.borrow(),
        Some((AwaitResult::Granted, RequestStatus::Granted, 3.))
    );
    assert_eq!(sim.time(), 4.);
    assert_eq!(pool.in_use(), 0);
    assert_eq!(pool.stats().promoted_grants, 1);
    assert_eq!(pool.stats().withdrawals, 0);
    assert_eq!(pool.stats().releases, 2);
    assert_eq!(sim.pending_event_count(), 0);
}

#[test]
fn test_zero_timeout_abandons_unless_granted_immediately() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    let results = Rc::new(RefCell::new(Vec::new()));

    for i in 0..3 {
        let ctx = sim.create_context(format!("user-{}", i));
        let pool = pool.clone();
        let results = results.clone();
        sim.spawn(async move {
            let request = pool.acquire();
            let result = request.with_timeout(0.).await?;
            results.borrow_mut().push(result);
            match result {
                AwaitResult::Granted => {
                    ctx.sleep(1.)?.await;
                    pool.release();
                }
                AwaitResult::Timeout { .. } => {
                    pool.withdraw(&request);
                }
            }
            Ok::<(), SimError>(())
        });
    }

    sim.step_until_no_events().unwrap();
    assert_eq!(
        *results.borrow(),
        vec![
            AwaitResult::Granted,
            AwaitResult::Timeout { timeout: 0. },
            AwaitResult::Timeout { timeout: 0. }
        ]
    );
    assert_eq!(pool.stats().withdrawals, 2);
}

#[test]
fn test_negative_timeout_is_rejected() {
    let mut sim = Simulation::new(42);
    let pool = pool(&mut sim, 1);
    let _holder = pool.acquire();

    let waiter_pool = pool.clone();
    sim.spawn(async move {
        let request = waiter_pool.acquire();
        request.with_timeout(-1.).await?;
        Ok::<(), SimError>(())
    });

    assert_eq!(sim.run_until(10.), Err(SimError::InvalidDuration { delay: -1. }));
}
